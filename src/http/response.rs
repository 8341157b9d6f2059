//! Response construction.
//!
//! # Responsibilities
//! - Represent a response as status, headers and exactly one body kind
//! - Provide the helpers handlers and middleware build responses with
//! - Provide the canned responses the dispatcher falls back to
//!
//! # Design Decisions
//! - `Content-Length` is always computed by the writer, never trusted from headers
//! - JSON helpers share one `{"status", "message"}` envelope
//! - `error` logs the real cause and sends a generic message

use std::fmt;

use serde::Serialize;
use tokio::io::AsyncRead;

use crate::http::StatusCode;

/// Message sent to clients by [`HttpResponse::error`].
pub const GENERIC_ERROR_MESSAGE: &str =
    "An error occurred and your request could not be completed.";

/// Response body: in-memory bytes or a stream with a declared length.
pub enum Body {
    Bytes(Vec<u8>),
    Stream {
        reader: Box<dyn AsyncRead + Send + Unpin>,
        length: u64,
    },
}

impl Body {
    /// Value written as `Content-Length`.
    pub fn content_length(&self) -> u64 {
        match self {
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::Stream { length, .. } => *length,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Body::Stream { length, .. } => f.debug_struct("Stream").field("length", length).finish(),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    status: bool,
    message: &'a str,
}

/// An HTTP response ready to be written to a connection.
#[derive(Debug)]
pub struct HttpResponse {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Body,
}

impl HttpResponse {
    /// An empty response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Bytes(Vec::new()),
        }
    }

    /// 200 with a `text/plain` body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK)
            .with_header("Content-Type", "text/plain")
            .with_body(body.into().into_bytes())
    }

    /// 200 with `value` serialized as JSON.
    ///
    /// A value that cannot be serialized yields the generic 500.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => Self::new(StatusCode::OK)
                .with_header("Content-Type", "application/json")
                .with_body(bytes),
            Err(e) => Self::error(e),
        }
    }

    /// 500 with a generic message; the cause is logged, never sent.
    pub fn error(cause: impl fmt::Display) -> Self {
        tracing::error!(error = %cause, "Request failed");
        Self::envelope(StatusCode::INTERNAL_SERVER_ERROR, false, GENERIC_ERROR_MESSAGE)
    }

    /// 500 carrying `message` to the client verbatim.
    pub fn error_message(message: &str) -> Self {
        Self::envelope(StatusCode::INTERNAL_SERVER_ERROR, false, message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::envelope(StatusCode::BAD_REQUEST, false, message)
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::envelope(StatusCode::UNAUTHORIZED, false, message)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::envelope(StatusCode::FORBIDDEN, false, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::envelope(StatusCode::NOT_FOUND, false, message)
    }

    /// 400 carrying the validation error's message.
    pub fn validation_error(err: impl fmt::Display) -> Self {
        Self::envelope(StatusCode::BAD_REQUEST, false, &err.to_string())
    }

    /// 200 `{"status": true, "message": ...}`.
    pub fn success(message: &str) -> Self {
        Self::envelope(StatusCode::OK, true, message)
    }

    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT)
    }

    /// 200 streaming exactly `length` bytes from `reader`.
    pub fn stream<R>(reader: R, length: u64) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            body: Body::Stream {
                reader: Box::new(reader),
                length,
            },
        }
    }

    /// Canned reply for paths or methods without a binding.
    pub fn route_not_found() -> Self {
        Self::text("404 not found").with_status(StatusCode::NOT_FOUND)
    }

    /// Canned reply when a handler yields nothing, panics or times out.
    pub fn internal_error() -> Self {
        Self::text("500 Internal Server Error").with_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn envelope(status: StatusCode, ok: bool, message: &str) -> Self {
        let envelope = Envelope {
            status: ok,
            message,
        };
        // Serializing a bool and a str cannot fail.
        let bytes = serde_json::to_vec(&envelope).unwrap_or_default();
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(bytes)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.set_header(key, value);
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Body::Bytes(body);
        self
    }

    /// Set a header, replacing any existing value under the same name.
    pub fn set_header(&mut self, key: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((key.to_string(), value.to_string())),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// In-memory body bytes, `None` for streamed responses.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        match &self.body {
            Body::Bytes(bytes) => Some(bytes),
            Body::Stream { .. } => None,
        }
    }

    pub(crate) fn into_parts(self) -> (StatusCode, Vec<(String, String)>, Body) {
        (self.status, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_of(resp: &HttpResponse) -> serde_json::Value {
        serde_json::from_slice(resp.body_bytes().unwrap()).unwrap()
    }

    #[test]
    fn text_response() {
        let resp = HttpResponse::text("hi");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.header("content-type"), Some("text/plain"));
        assert_eq!(resp.body_bytes(), Some(&b"hi"[..]));
    }

    #[test]
    fn error_hides_cause() {
        let resp = HttpResponse::error("db connection refused");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = envelope_of(&resp);
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn envelope_helpers_set_status() {
        let cases = [
            (HttpResponse::bad_request("x"), StatusCode::BAD_REQUEST, false),
            (HttpResponse::unauthorized("x"), StatusCode::UNAUTHORIZED, false),
            (HttpResponse::forbidden("x"), StatusCode::FORBIDDEN, false),
            (HttpResponse::not_found("x"), StatusCode::NOT_FOUND, false),
            (HttpResponse::error_message("x"), StatusCode::INTERNAL_SERVER_ERROR, false),
            (HttpResponse::success("x"), StatusCode::OK, true),
        ];
        for (resp, status, ok) in cases {
            assert_eq!(resp.status(), status);
            let body = envelope_of(&resp);
            assert_eq!(body["status"], ok);
            assert_eq!(body["message"], "x");
        }
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut resp = HttpResponse::text("x");
        resp.set_header("content-type", "text/html");
        assert_eq!(resp.headers().len(), 1);
        assert_eq!(resp.header("Content-Type"), Some("text/html"));
    }

    #[test]
    fn stream_body_has_declared_length() {
        let resp = HttpResponse::stream(&b"abcdef"[..], 4);
        assert_eq!(resp.body().content_length(), 4);
        assert!(resp.body_bytes().is_none());
    }

    #[test]
    fn canned_responses() {
        let resp = HttpResponse::route_not_found();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.body_bytes(), Some(&b"404 not found"[..]));

        let resp = HttpResponse::internal_error();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.body_bytes(), Some(&b"500 Internal Server Error"[..]));
    }
}
