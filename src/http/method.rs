//! Request methods understood by the server.

use std::fmt;

/// Number of routable methods, i.e. the size of a route node's method table.
pub const METHOD_COUNT: usize = 6;

/// HTTP request method.
///
/// `Unknown` is produced only while classifying a token and never reaches
/// a handler: the parser rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Unknown,
}

impl Method {
    /// All routable methods, in method-table order.
    pub const ALL: [Method; METHOD_COUNT] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Options,
    ];

    /// Classify a raw method token. Matching is case-sensitive.
    pub fn from_bytes(token: &[u8]) -> Self {
        match token {
            b"GET" => Method::Get,
            b"POST" => Method::Post,
            b"PUT" => Method::Put,
            b"PATCH" => Method::Patch,
            b"DELETE" => Method::Delete,
            b"OPTIONS" => Method::Options,
            _ => Method::Unknown,
        }
    }

    /// Slot in a route node's method table. `None` for `Unknown`.
    pub fn index(self) -> Option<usize> {
        match self {
            Method::Get => Some(0),
            Method::Post => Some(1),
            Method::Put => Some(2),
            Method::Patch => Some(3),
            Method::Delete => Some(4),
            Method::Options => Some(5),
            Method::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
