//! Incremental HTTP/1.1 request parser.
//!
//! # Responsibilities
//! - Turn raw connection bytes into a [`ParsedRequest`]
//! - Fail definitively on malformed or incomplete input
//! - Bound the whole parse by a read deadline
//!
//! # Design Decisions
//! - One request per connection: nothing after the body is read
//! - A body shorter than `Content-Length` discards the request
//! - Declared bodies larger than the request cap are rejected before reading

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncRead;

use crate::config::LimitsConfig;
use crate::http::method::Method;
use crate::http::request::ParsedRequest;
use crate::net::buffer::{BufferError, ByteBuffer};

/// Reasons a request could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    #[error("request target is not terminated")]
    MissingPathTerminator,

    #[error("connection closed while reading the {0}")]
    Incomplete(&'static str),

    #[error("header line without a colon: `{0}`")]
    MalformedHeader(String),

    #[error("request {0} is not valid UTF-8")]
    InvalidEncoding(&'static str),

    #[error("body shorter than Content-Length ({received} of {expected} bytes)")]
    ShortBody { expected: usize, received: usize },

    #[error("declared body of {declared} bytes exceeds the {limit} byte limit")]
    TooLarge { declared: usize, limit: usize },

    #[error("request not received within {0:?}")]
    Timeout(Duration),
}

/// Per-request read limits.
#[derive(Debug, Clone, Copy)]
pub struct ParseLimits {
    pub read_deadline: Duration,
    pub chunk_size: usize,
    pub max_request_bytes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self::from(&LimitsConfig::default())
    }
}

impl From<&LimitsConfig> for ParseLimits {
    fn from(config: &LimitsConfig) -> Self {
        Self {
            read_deadline: Duration::from_secs(config.read_deadline_secs),
            chunk_size: config.read_chunk_size,
            max_request_bytes: config.max_request_bytes,
        }
    }
}

/// Read and parse one request from `stream`, bounded by the read deadline.
pub async fn read_request<R>(
    stream: &mut R,
    peer: SocketAddr,
    limits: &ParseLimits,
) -> Result<ParsedRequest, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = ByteBuffer::new(stream, limits.chunk_size, limits.max_request_bytes);
    match tokio::time::timeout(limits.read_deadline, parse_request(&mut buffer, peer)).await {
        Ok(result) => result,
        Err(_) => Err(ParseError::Timeout(limits.read_deadline)),
    }
}

/// Parse one request from an already wrapped buffer.
pub async fn parse_request<R>(
    buffer: &mut ByteBuffer<'_, R>,
    peer: SocketAddr,
) -> Result<ParsedRequest, ParseError>
where
    R: AsyncRead + Unpin,
{
    let token = buffer
        .read_until(b' ')
        .await?
        .ok_or(ParseError::Incomplete("method"))?;
    let method = Method::from_bytes(&token);
    if method == Method::Unknown {
        return Err(ParseError::UnknownMethod(
            String::from_utf8_lossy(&token).into_owned(),
        ));
    }

    let target = buffer
        .read_until(b' ')
        .await?
        .ok_or(ParseError::MissingPathTerminator)?;
    let target = String::from_utf8(target).map_err(|_| ParseError::InvalidEncoding("target"))?;
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target, None),
    };

    if !buffer.skip_through(b'\n').await? {
        return Err(ParseError::Incomplete("request line"));
    }

    let headers = parse_headers(buffer).await?;
    let body = read_body(buffer, &headers).await?;

    Ok(ParsedRequest::new(method, path, query, headers, body, peer))
}

async fn parse_headers<R>(
    buffer: &mut ByteBuffer<'_, R>,
) -> Result<HashMap<String, String>, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut headers = HashMap::new();
    loop {
        let mut line = buffer
            .read_until(b'\n')
            .await?
            .ok_or(ParseError::Incomplete("headers"))?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.is_empty() {
            return Ok(headers);
        }

        let line = String::from_utf8(line).map_err(|_| ParseError::InvalidEncoding("header"))?;
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedHeader(line.clone()))?;
        let value = value.strip_prefix(' ').unwrap_or(value);
        headers.insert(key.to_ascii_lowercase(), value.to_string());
    }
}

async fn read_body<R>(
    buffer: &mut ByteBuffer<'_, R>,
    headers: &HashMap<String, String>,
) -> Result<Option<Vec<u8>>, ParseError>
where
    R: AsyncRead + Unpin,
{
    let declared = headers
        .get("content-length")
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    if declared == 0 {
        return Ok(None);
    }

    let limit = buffer.max_bytes();
    if declared > limit {
        return Err(ParseError::TooLarge { declared, limit });
    }

    let body = buffer.read_exact(declared).await?;
    if body.len() < declared {
        return Err(ParseError::ShortBody {
            expected: declared,
            received: body.len(),
        });
    }
    Ok(Some(body))
}
