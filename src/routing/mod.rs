//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     (method, path, handler, middleware)
//!     → matcher.rs (split path, classify literal / :param segments)
//!     → router.rs (walk or create trie nodes, bind at terminal node)
//!     → group.rs (prefix-mounted batches of routes)
//!
//! Lookup (per request):
//!     request path → router.rs (literal-first walk) → node + params
//! ```
//!
//! # Design Decisions
//! - Trie built once, immutable and `Arc`-shared while serving
//! - Deterministic: the same path always resolves to the same node
//! - Parameters match exactly one segment

pub mod group;
pub mod handler;
pub mod matcher;
pub mod router;

pub use group::{GroupedRoute, RouteGroup};
pub use handler::{handler, middleware, HandlerFn, MiddlewareFn, RouteHandler, RouteRequest};
pub use router::{RouteCollection, RouteMatch, RouteNode};
