//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!       (worker, connection_id, peer, method, path)
//!     → logging.rs (subscriber: env filter + pretty or JSON output)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Connection ID flows through every per-request event

pub mod logging;

pub use logging::init_logging;
