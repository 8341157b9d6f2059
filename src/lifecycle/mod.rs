//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → accept loop stops → dispatch loop stops
//!               → idle workers exit → in-flight requests finish → serve returns
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger()
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accept, stop dispatch, drain workers
//! - No forced abort: a worker holding a connection serves it to completion

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
