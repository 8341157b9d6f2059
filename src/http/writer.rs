//! Response serialization onto a connection.

use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{Body, HttpResponse};

/// Write `response` to `stream` and return the number of body bytes sent.
///
/// Any header named `Content-Length` is dropped in favor of the computed
/// value. A stream that ends before its declared length is an
/// `UnexpectedEof` error. Errors abort the write; the caller closes the
/// connection either way.
pub async fn write_response<W>(stream: &mut W, response: HttpResponse) -> std::io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let (status, headers, body) = response.into_parts();

    let reason = status.canonical_reason().unwrap_or("Unknown");
    let mut head = format!("HTTP/1.1 {} {}\r\n", status.as_u16(), reason);
    for (key, value) in headers
        .iter()
        .filter(|(key, _)| !key.eq_ignore_ascii_case("content-length"))
    {
        head.push_str(key);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str(&format!("Content-Length: {}\r\n\r\n", body.content_length()));
    stream.write_all(head.as_bytes()).await?;

    let sent = match body {
        Body::Bytes(bytes) => {
            stream.write_all(&bytes).await?;
            bytes.len() as u64
        }
        Body::Stream { reader, length } => {
            let mut limited = reader.take(length);
            let sent = tokio::io::copy(&mut limited, stream).await?;
            if sent != length {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("stream ended after {sent} of {length} bytes"),
                ));
            }
            sent
        }
    };
    stream.flush().await?;
    Ok(sent)
}
