//! Pilot HTTP: a small HTTP/1.1 server engine.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──TCP──▶ net::listener (accept loop)
//!                        │
//!                        ▼  bounded receive queue
//!                   server::pool (dispatch loop)
//!                        │
//!                        ▼  bounded work queue
//!                   server::worker × N
//!                        │
//!                        ├─▶ http::parser (net::buffer, read deadline)
//!                        ├─▶ server::dispatcher
//!                        │       ├─ OPTIONS → security::cors preflight
//!                        │       ├─ routing trie → 404 on miss
//!                        │       ├─ middleware chain (first response wins)
//!                        │       └─ handler (None / panic / timeout → 500)
//!                        ├─▶ security::cors (every response)
//!                        └─▶ http::writer → close
//! ```
//!
//! One request per connection; no keep-alive, TLS or chunked encoding.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;
pub mod server;

pub use config::ServerConfig;
pub use crate::http::{HttpResponse, JsonBody, Method, ParsedRequest, StatusCode};
pub use lifecycle::Shutdown;
pub use routing::{GroupedRoute, RouteGroup, RouteRequest};
pub use server::{Application, Server, ServerError};
