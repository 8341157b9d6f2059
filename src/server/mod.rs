//! Server subsystem: application, worker pool and request dispatch.
//!
//! # Data Flow
//! ```text
//! Application (routes + config)
//!     → app.rs (validate, bind, build dispatcher)
//!     → pool.rs (accept task → receive queue → dispatch loop → work queue)
//!     → worker.rs (parse → dispatch → write → close)
//!     → dispatcher.rs (preflight / 404 / middleware / handler / 500, CORS)
//! ```

pub mod app;
pub mod dispatcher;
pub mod pool;
pub mod worker;

pub use app::{Application, Server, ServerError};
pub use dispatcher::{Dispatcher, StateFactory};
pub use pool::WorkerPool;
