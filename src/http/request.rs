//! Parsed request representation.
//!
//! # Responsibilities
//! - Hold the immutable result of a successful parse
//! - Case-insensitive header lookup
//! - Query string decoding and typed query accessors
//!
//! # Design Decisions
//! - Header names are stored lowercased; the last duplicate wins, whatever
//!   its case
//! - The query string is kept raw and decoded lazily on first access

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::OnceLock;

use uuid::Uuid;

use crate::http::body::{BodyError, JsonBody};
use crate::http::method::Method;

/// A fully parsed HTTP request.
#[derive(Debug)]
pub struct ParsedRequest {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
    peer: SocketAddr,
    decoded_query: OnceLock<HashMap<String, String>>,
}

impl ParsedRequest {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        query: Option<String>,
        headers: HashMap<String, String>,
        body: Option<Vec<u8>>,
        peer: SocketAddr,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            query,
            headers: headers
                .into_iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), value))
                .collect(),
            body,
            peer,
            decoded_query: OnceLock::new(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Request path without the query string, exactly as received.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string (text after the first `?`), if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// All headers, keyed by lowercased name.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// URL-decoded query parameters. Repeated keys keep the last value.
    pub fn query_map(&self) -> &HashMap<String, String> {
        self.decoded_query.get_or_init(|| {
            self.query
                .as_deref()
                .map(|raw| {
                    url::form_urlencoded::parse(raw.as_bytes())
                        .into_owned()
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    pub fn query_string(&self, name: &str) -> Option<String> {
        self.query_map().get(name).cloned()
    }

    pub fn query_i32(&self, name: &str) -> Option<i32> {
        self.query_map().get(name)?.parse().ok()
    }

    pub fn query_i64(&self, name: &str) -> Option<i64> {
        self.query_map().get(name)?.parse().ok()
    }

    pub fn query_uuid(&self, name: &str) -> Option<Uuid> {
        Uuid::parse_str(self.query_map().get(name)?).ok()
    }

    /// Decode the body as a JSON document.
    pub fn json_body(&self) -> Result<JsonBody, BodyError> {
        match &self.body {
            Some(bytes) => JsonBody::parse(bytes),
            None => Err(BodyError::Unparsable("request has no body".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: Option<&str>, headers: &[(&str, &str)]) -> ParsedRequest {
        ParsedRequest::new(
            Method::Get,
            "/items",
            query.map(str::to_string),
            headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            None,
            "127.0.0.1:4000".parse().unwrap(),
        )
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = request(None, &[("Content-Type", "text/plain")]);
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn query_values_are_decoded_and_typed() {
        let id = Uuid::new_v4();
        let raw = format!("name=hello%20world&page=3&big=9000000000&id={id}&bad=x");
        let req = request(Some(&raw), &[]);

        assert_eq!(req.query_string("name").as_deref(), Some("hello world"));
        assert_eq!(req.query_i32("page"), Some(3));
        assert_eq!(req.query_i32("big"), None);
        assert_eq!(req.query_i64("big"), Some(9_000_000_000));
        assert_eq!(req.query_uuid("id"), Some(id));
        assert_eq!(req.query_i32("bad"), None);
        assert_eq!(req.query_i32("missing"), None);
    }

    #[test]
    fn missing_body_is_not_json() {
        let req = request(None, &[]);
        assert!(matches!(req.json_body(), Err(BodyError::Unparsable(_))));
    }
}
