//! Request dispatch: route lookup, middleware chain, handler, CORS.
//!
//! # Responsibilities
//! - Answer `OPTIONS` with the preflight reply
//! - Resolve the route, or fall back to the canned 404
//! - Run middleware in order; the first response short-circuits
//! - Run the handler; no response, a panic or a timeout yield the canned 500
//! - Stamp CORS headers on whatever response came out
//!
//! # Design Decisions
//! - Never fails: every request gets exactly one response
//! - Handler panics are contained here so a worker never dies

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;

use crate::http::method::Method;
use crate::http::request::ParsedRequest;
use crate::http::response::HttpResponse;
use crate::lifecycle::Shutdown;
use crate::routing::{RouteCollection, RouteHandler, RouteMatch, RouteRequest};
use crate::security::cors::CorsPolicy;

/// Builds the per-request state value.
pub type StateFactory<S> = Arc<dyn Fn() -> S + Send + Sync>;

/// Immutable request dispatcher shared by all workers.
pub struct Dispatcher<S, D> {
    routes: Arc<RouteCollection<S, D>>,
    database: Arc<D>,
    state_factory: StateFactory<S>,
    cors: CorsPolicy,
    handler_timeout: Option<Duration>,
    shutdown: Shutdown,
}

impl<S, D> Dispatcher<S, D>
where
    S: Send + 'static,
    D: Send + Sync + 'static,
{
    pub fn new(
        routes: Arc<RouteCollection<S, D>>,
        database: Arc<D>,
        state_factory: StateFactory<S>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            routes,
            database,
            state_factory,
            cors: CorsPolicy::default(),
            handler_timeout: None,
            shutdown,
        }
    }

    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    /// Bound middleware plus handler time. `None` disables the bound.
    pub fn with_handler_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.handler_timeout = timeout;
        self
    }

    /// Produce the response for one parsed request, CORS headers included.
    pub async fn dispatch(&self, request: ParsedRequest) -> HttpResponse {
        let mut response = self.respond(request).await;
        self.cors.apply(&mut response);
        response
    }

    async fn respond(&self, request: ParsedRequest) -> HttpResponse {
        let method = request.method();
        if method == Method::Options {
            return self.cors.preflight();
        }

        let Some(RouteMatch { node, params }) = self.routes.find(request.path()) else {
            tracing::debug!(path = %request.path(), "No route found");
            return HttpResponse::route_not_found();
        };
        let Some(binding) = node.binding(method) else {
            tracing::debug!(method = %method, path = %request.path(), "No handler found");
            return HttpResponse::route_not_found();
        };

        let mut ctx = RouteRequest::new(
            request,
            Arc::clone(&self.database),
            (self.state_factory)(),
            params,
            self.shutdown.clone(),
        );

        let chain = AssertUnwindSafe(run_chain(binding, &mut ctx)).catch_unwind();
        let outcome = match self.handler_timeout {
            Some(limit) => match tokio::time::timeout(limit, chain).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(timeout = ?limit, "Handler timed out, sending 500");
                    return HttpResponse::internal_error();
                }
            },
            None => chain.await,
        };

        match outcome {
            Ok(Some(response)) => response,
            Ok(None) => {
                tracing::warn!("Handler returned no response, sending 500");
                HttpResponse::internal_error()
            }
            Err(panic) => {
                tracing::error!(panic = %panic_message(&*panic), "Handler panicked, sending 500");
                HttpResponse::internal_error()
            }
        }
    }
}

async fn run_chain<S, D>(
    binding: &RouteHandler<S, D>,
    ctx: &mut RouteRequest<S, D>,
) -> Option<HttpResponse> {
    for middleware in &binding.middleware {
        if let Some(response) = middleware(ctx).await {
            return Some(response);
        }
    }
    (binding.handler)(ctx).await
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;
    use crate::routing::middleware;
    use crate::security::cors::{ALLOW_METHODS, ALLOW_ORIGIN};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Trace = Vec<&'static str>;
    type Routes = RouteCollection<Trace, AtomicUsize>;

    fn request(method: Method, path: &str, headers: &[(&str, &str)]) -> ParsedRequest {
        let headers: HashMap<String, String> = headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ParsedRequest::new(
            method,
            path,
            None,
            headers,
            None,
            "127.0.0.1:9999".parse().unwrap(),
        )
    }

    fn dispatcher(routes: Routes) -> (Dispatcher<Trace, AtomicUsize>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new(
            Arc::new(routes),
            Arc::clone(&calls),
            Arc::new(Trace::new),
            Shutdown::new(),
        )
        .with_cors(CorsPolicy::new("https://app.example", "*", "GET"));
        (dispatcher, calls)
    }

    fn require_token() -> crate::routing::MiddlewareFn<Trace, AtomicUsize> {
        middleware(|req: &mut RouteRequest<Trace, AtomicUsize>| {
            Box::pin(async move {
                req.state.push("auth");
                match req.request.header("authorization") {
                    Some(_) => None,
                    None => Some(HttpResponse::unauthorized("missing token")),
                }
            })
        })
    }

    fn tag(label: &'static str) -> crate::routing::MiddlewareFn<Trace, AtomicUsize> {
        middleware(move |req: &mut RouteRequest<Trace, AtomicUsize>| {
            Box::pin(async move {
                req.state.push(label);
                None::<HttpResponse>
            })
        })
    }

    fn protected_routes() -> Routes {
        let mut routes = Routes::new();
        routes.add_route_with_middleware(
            Method::Get,
            "/secret",
            |req| {
                Box::pin(async move {
                    req.database.fetch_add(1, Ordering::SeqCst);
                    req.state.push("handler");
                    Some(HttpResponse::text(req.state.join(",")))
                })
            },
            vec![tag("first"), require_token(), tag("last")],
        );
        routes
    }

    #[tokio::test]
    async fn options_gets_preflight_for_any_path() {
        let (dispatcher, calls) = dispatcher(Routes::new());
        let resp = dispatcher.dispatch(request(Method::Options, "/anything", &[])).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body_bytes(), Some(&b""[..]));
        assert_eq!(resp.header(ALLOW_ORIGIN), Some("https://app.example"));
        assert_eq!(resp.header(ALLOW_METHODS), Some("GET"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_path_and_unbound_method_are_404() {
        let (dispatcher, _) = dispatcher(protected_routes());

        let resp = dispatcher.dispatch(request(Method::Get, "/missing", &[])).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.body_bytes(), Some(&b"404 not found"[..]));
        assert_eq!(resp.header(ALLOW_ORIGIN), Some("https://app.example"));

        let resp = dispatcher.dispatch(request(Method::Post, "/secret", &[])).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn middleware_short_circuits_before_handler() {
        let (dispatcher, calls) = dispatcher(protected_routes());
        let resp = dispatcher.dispatch(request(Method::Get, "/secret", &[])).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.header(ALLOW_ORIGIN), Some("https://app.example"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn middleware_runs_in_order_then_handler() {
        let (dispatcher, calls) = dispatcher(protected_routes());
        let resp = dispatcher
            .dispatch(request(Method::Get, "/secret", &[("Authorization", "Bearer t")]))
            .await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body_bytes(), Some(&b"first,auth,last,handler"[..]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn state_is_fresh_per_request() {
        let (dispatcher, _) = dispatcher(protected_routes());
        let authed = [("Authorization", "x")];
        dispatcher.dispatch(request(Method::Get, "/secret", &authed)).await;
        let resp = dispatcher.dispatch(request(Method::Get, "/secret", &authed)).await;
        assert_eq!(resp.body_bytes(), Some(&b"first,auth,last,handler"[..]));
    }

    #[tokio::test]
    async fn params_reach_handler() {
        let mut routes = Routes::new();
        routes.get("/users/:id", |req| {
            Box::pin(async move { req.param("id").map(HttpResponse::text) })
        });
        let (dispatcher, _) = dispatcher(routes);

        let resp = dispatcher.dispatch(request(Method::Get, "/users/42", &[])).await;
        assert_eq!(resp.body_bytes(), Some(&b"42"[..]));
    }

    #[tokio::test]
    async fn missing_handler_response_becomes_500() {
        let mut routes = Routes::new();
        routes.get("/nothing", |_| Box::pin(async { None::<HttpResponse> }));
        let (dispatcher, _) = dispatcher(routes);

        let resp = dispatcher.dispatch(request(Method::Get, "/nothing", &[])).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.body_bytes(), Some(&b"500 Internal Server Error"[..]));
        assert_eq!(resp.header(ALLOW_ORIGIN), Some("https://app.example"));
    }

    #[tokio::test]
    async fn panicking_handler_becomes_500() {
        let mut routes = Routes::new();
        routes.get("/boom", |_| {
            Box::pin(async {
                if true {
                    panic!("handler exploded");
                }
                None::<HttpResponse>
            })
        });
        let (dispatcher, _) = dispatcher(routes);

        let resp = dispatcher.dispatch(request(Method::Get, "/boom", &[])).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn slow_handler_times_out_when_bounded() {
        let mut routes = Routes::new();
        routes.get("/slow", |_| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Some(HttpResponse::text("late"))
            })
        });
        let (dispatcher, _) = dispatcher(routes);
        let dispatcher = dispatcher.with_handler_timeout(Some(Duration::from_millis(20)));

        let resp = dispatcher.dispatch(request(Method::Get, "/slow", &[])).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
