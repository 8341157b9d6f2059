//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → parser.rs (bytes → ParsedRequest, under a read deadline)
//!     → request.rs (header, query and body accessors)
//!     → [routing + middleware + handler]
//!     → response.rs (HttpResponse helpers, canned replies)
//!     → writer.rs (status line, headers, Content-Length, body)
//!     → connection closed
//! ```

pub mod body;
pub mod method;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

pub use body::{BodyError, JsonBody};
pub use method::Method;
pub use parser::{read_request, ParseError, ParseLimits};
pub use request::ParsedRequest;
pub use response::{Body, HttpResponse};
pub use writer::write_response;

pub use ::http::StatusCode;
