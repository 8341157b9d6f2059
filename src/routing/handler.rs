//! Handler and middleware types.
//!
//! Both are async closures over a mutable [`RouteRequest`]. A middleware that
//! returns `Some(response)` ends the chain; a handler that returns `None` is
//! treated as an internal error by the dispatcher.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::http::request::ParsedRequest;
use crate::http::response::HttpResponse;
use crate::lifecycle::Shutdown;

/// Everything a handler or middleware can see for one request.
pub struct RouteRequest<S, D> {
    /// The parsed request.
    pub request: ParsedRequest,
    /// Shared data-layer handle supplied at application construction.
    pub database: Arc<D>,
    /// Per-request state, fresh for every request.
    pub state: S,
    params: HashMap<String, String>,
    shutdown: Shutdown,
}

impl<S, D> RouteRequest<S, D> {
    pub fn new(
        request: ParsedRequest,
        database: Arc<D>,
        state: S,
        params: HashMap<String, String>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            request,
            database,
            state,
            params,
            shutdown,
        }
    }

    /// Value captured by a `:name` segment of the matched route.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Server shutdown token, for handlers that run long enough to care.
    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }
}

/// Type-erased async route function.
pub type RouteFn<S, D> = Arc<
    dyn for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
        + Send
        + Sync,
>;

/// Terminal function of a route.
pub type HandlerFn<S, D> = RouteFn<S, D>;

/// Function run before the handler; `Some` short-circuits.
pub type MiddlewareFn<S, D> = RouteFn<S, D>;

/// Box a closure as a handler.
pub fn handler<S, D, F>(f: F) -> HandlerFn<S, D>
where
    F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Box a closure as a middleware.
pub fn middleware<S, D, F>(f: F) -> MiddlewareFn<S, D>
where
    F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// A handler plus its ordered middleware, bound to one (node, method).
pub struct RouteHandler<S, D> {
    pub handler: HandlerFn<S, D>,
    pub middleware: Vec<MiddlewareFn<S, D>>,
}

impl<S, D> Clone for RouteHandler<S, D> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            middleware: self.middleware.clone(),
        }
    }
}
