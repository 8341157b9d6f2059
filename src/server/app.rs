//! Application: route registration plus server startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::net::TcpListener;

use crate::config::validation::join_errors;
use crate::config::{validate_config, ServerConfig, ValidationError};
use crate::http::method::Method;
use crate::http::parser::ParseLimits;
use crate::http::response::HttpResponse;
use crate::lifecycle::Shutdown;
use crate::net::{ConnectionTracker, ListenerError};
use crate::routing::{MiddlewareFn, RouteCollection, RouteGroup, RouteRequest};
use crate::security::cors::CorsPolicy;
use crate::server::dispatcher::{Dispatcher, StateFactory};
use crate::server::pool::WorkerPool;

/// Errors raised while starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),

    #[error(transparent)]
    Bind(#[from] ListenerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A configured set of routes waiting to be served.
///
/// `S` is the per-request state type, built fresh for every request. `D` is
/// the shared data-layer handle; the server never touches it.
pub struct Application<S, D = ()> {
    config: ServerConfig,
    routes: RouteCollection<S, D>,
    database: Arc<D>,
    state_factory: StateFactory<S>,
}

impl<S, D> Application<S, D>
where
    S: Default + Send + 'static,
    D: Send + Sync + 'static,
{
    /// Per-request state is built with `S::default()`.
    pub fn new(config: ServerConfig, database: impl Into<Arc<D>>) -> Self {
        Self::with_state_factory(config, database, S::default)
    }
}

impl<S, D> Application<S, D>
where
    S: Send + 'static,
    D: Send + Sync + 'static,
{
    /// Per-request state is built by `factory`.
    pub fn with_state_factory<F>(config: ServerConfig, database: impl Into<Arc<D>>, factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        Self {
            config,
            routes: RouteCollection::new(),
            database: database.into(),
            state_factory: Arc::new(factory),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteCollection<S, D> {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut RouteCollection<S, D> {
        &mut self.routes
    }

    pub fn add_route<F>(&mut self, method: Method, path: &str, handler: F)
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        self.routes.add_route(method, path, handler);
    }

    pub fn add_route_with_middleware<F>(
        &mut self,
        method: Method,
        path: &str,
        handler: F,
        middleware: Vec<MiddlewareFn<S, D>>,
    ) where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        self.routes
            .add_route_with_middleware(method, path, handler, middleware);
    }

    /// Mount every route of `group` under `prefix`.
    pub fn add_route_group(&mut self, prefix: &str, group: RouteGroup<S, D>) {
        self.routes.add_group(prefix, group);
    }

    /// Validate the configuration and bind the listener.
    ///
    /// The returned server stops when `shutdown` is triggered. Handlers see
    /// the same token through [`RouteRequest::shutdown`].
    pub async fn bind(self, shutdown: Shutdown) -> Result<Server<S, D>, ServerError> {
        validate_config(&self.config).map_err(ServerError::Config)?;

        let listener = crate::net::bind(&self.config.listener).await?;
        let local_addr = listener.local_addr()?;

        if !self.config.observability.silent {
            tracing::info!(routes = self.routes.len(), "Route tree:\n{}", self.routes);
        }

        let handler_timeout = self
            .config
            .limits
            .handler_timeout_secs
            .map(Duration::from_secs);
        let dispatcher = Dispatcher::new(
            Arc::new(self.routes),
            self.database,
            self.state_factory,
            shutdown.clone(),
        )
        .with_cors(CorsPolicy::from(&self.config.cors))
        .with_handler_timeout(handler_timeout);

        let pool = WorkerPool::new(
            Arc::new(dispatcher),
            self.config.workers.clone(),
            ParseLimits::from(&self.config.limits),
        );

        Ok(Server {
            listener,
            local_addr,
            pool,
            shutdown,
        })
    }

    /// Bind and serve until `shutdown` is triggered.
    pub async fn start(self, shutdown: Shutdown) -> Result<(), ServerError> {
        self.bind(shutdown).await?.serve().await;
        Ok(())
    }
}

/// A bound server, ready to accept connections.
pub struct Server<S, D> {
    listener: TcpListener,
    local_addr: SocketAddr,
    pool: WorkerPool<S, D>,
    shutdown: Shutdown,
}

impl<S, D> Server<S, D>
where
    S: Send + 'static,
    D: Send + Sync + 'static,
{
    /// Address actually bound; useful with port `0`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The token that stops this server.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Tracker counting connections currently being served.
    pub fn connections(&self) -> ConnectionTracker {
        self.pool.tracker()
    }

    /// Serve until shutdown; returns after in-flight requests finish.
    pub async fn serve(self) {
        tracing::info!(address = %self.local_addr, "Server listening");
        self.pool.run(self.listener, self.shutdown).await;
        tracing::info!("Server stopped");
    }
}
