//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop → bounded receive queue)
//!     → connection.rs (connection ID, in-flight tracking)
//!     → buffer.rs (chunked reads for the request parser)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded queues prevent resource exhaustion
//! - Each served connection tracked for graceful shutdown
//! - One request per connection; the worker closes it afterwards

pub mod buffer;
pub mod connection;
pub mod listener;

pub use buffer::{BufferError, ByteBuffer};
pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{accept_loop, bind, Incoming, ListenerError};
