//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response (any path: handler, middleware, 404, 500)
//!     → cors.rs (Access-Control-Allow-* headers)
//!     → response writer
//!
//! OPTIONS request
//!     → cors.rs (preflight reply, router never consulted)
//! ```

pub mod cors;

pub use cors::CorsPolicy;
