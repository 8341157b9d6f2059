//! Refillable byte buffer over a raw connection.
//!
//! # Responsibilities
//! - Pull bytes from the socket in fixed-size chunks, on demand
//! - Provide scanning primitives (read-until, skip-through, peek, read-exact)
//! - Cap the total number of bytes read for one request
//!
//! # Design Decisions
//! - Bytes are consumed destructively: the cursor only moves forward
//! - EOF is reported as a value (`None` / `false` / short read), not an error
//! - Exceeding the cap is an error so callers fail closed

use tokio::io::{AsyncRead, AsyncReadExt};

/// Default refill chunk size.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Errors raised while refilling the buffer.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// Reading from the connection failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The request grew past the configured byte cap.
    #[error("request exceeds {limit} bytes")]
    Overflow { limit: usize },
}

/// Incremental reader over one connection.
pub struct ByteBuffer<'r, R> {
    reader: &'r mut R,
    buffer: Vec<u8>,
    cursor: usize,
    chunk_size: usize,
    max_bytes: usize,
    total_read: usize,
}

impl<'r, R> ByteBuffer<'r, R>
where
    R: AsyncRead + Unpin,
{
    /// Wrap a reader with the given refill chunk size and byte cap.
    pub fn new(reader: &'r mut R, chunk_size: usize, max_bytes: usize) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(chunk_size),
            cursor: 0,
            chunk_size: chunk_size.max(1),
            max_bytes,
            total_read: 0,
        }
    }

    /// Number of buffered, not yet consumed bytes.
    pub fn available(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    /// Total bytes pulled from the connection so far.
    pub fn total_read(&self) -> usize {
        self.total_read
    }

    /// The configured byte cap.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Read up to one chunk from the connection. Returns `0` on EOF.
    pub async fn refill(&mut self) -> Result<usize, BufferError> {
        if self.total_read >= self.max_bytes {
            return Err(BufferError::Overflow {
                limit: self.max_bytes,
            });
        }

        self.compact();
        let want = self.chunk_size.min(self.max_bytes - self.total_read);
        let start = self.buffer.len();
        self.buffer.resize(start + want, 0);

        let read = match self.reader.read(&mut self.buffer[start..]).await {
            Ok(n) => n,
            Err(e) => {
                self.buffer.truncate(start);
                return Err(e.into());
            }
        };
        self.buffer.truncate(start + read);
        self.total_read += read;
        Ok(read)
    }

    /// Return the bytes before `delim` and consume through it.
    ///
    /// `None` means the connection closed before the delimiter was seen.
    pub async fn read_until(&mut self, delim: u8) -> Result<Option<Vec<u8>>, BufferError> {
        let mut scanned = 0;
        loop {
            let pending = &self.buffer[self.cursor..];
            if let Some(pos) = pending[scanned..].iter().position(|b| *b == delim) {
                let end = self.cursor + scanned + pos;
                let out = self.buffer[self.cursor..end].to_vec();
                self.cursor = end + 1;
                return Ok(Some(out));
            }
            scanned = pending.len();
            if self.refill().await? == 0 {
                return Ok(None);
            }
        }
    }

    /// Consume everything up to and including `delim`.
    pub async fn skip_through(&mut self, delim: u8) -> Result<bool, BufferError> {
        loop {
            let pending = &self.buffer[self.cursor..];
            if let Some(pos) = pending.iter().position(|b| *b == delim) {
                self.cursor += pos + 1;
                return Ok(true);
            }
            self.cursor = self.buffer.len();
            if self.refill().await? == 0 {
                return Ok(false);
            }
        }
    }

    /// Look at the next byte without consuming it.
    pub async fn peek(&mut self) -> Result<Option<u8>, BufferError> {
        if self.available() == 0 && self.refill().await? == 0 {
            return Ok(None);
        }
        Ok(self.buffer.get(self.cursor).copied())
    }

    /// Consume up to `count` bytes, refilling until that many are buffered.
    ///
    /// Returns fewer bytes when the connection closes first; callers must
    /// check the length before trusting the data.
    pub async fn read_exact(&mut self, count: usize) -> Result<Vec<u8>, BufferError> {
        while self.available() < count {
            if self.refill().await? == 0 {
                break;
            }
        }
        let take = count.min(self.available());
        let out = self.buffer[self.cursor..self.cursor + take].to_vec();
        self.cursor += take;
        Ok(out)
    }

    fn compact(&mut self) {
        if self.cursor > 0 {
            self.buffer.drain(..self.cursor);
            self.cursor = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_until_across_chunks() {
        let mut input: &[u8] = b"GET /a/long/path HTTP/1.1\r\n";
        let mut buf = ByteBuffer::new(&mut input, 4, 1024);

        assert_eq!(buf.read_until(b' ').await.unwrap().unwrap(), b"GET");
        assert_eq!(buf.read_until(b' ').await.unwrap().unwrap(), b"/a/long/path");
        assert!(buf.skip_through(b'\n').await.unwrap());
        assert_eq!(buf.peek().await.unwrap(), None);
    }

    #[tokio::test]
    async fn read_until_reports_missing_delimiter() {
        let mut input: &[u8] = b"no-delimiter-here";
        let mut buf = ByteBuffer::new(&mut input, 8, 1024);
        assert!(buf.read_until(b'\n').await.unwrap().is_none());
    }

    #[tokio::test]
    async fn peek_does_not_consume() {
        let mut input: &[u8] = b"xy";
        let mut buf = ByteBuffer::new(&mut input, 1, 1024);
        assert_eq!(buf.peek().await.unwrap(), Some(b'x'));
        assert_eq!(buf.peek().await.unwrap(), Some(b'x'));
        assert_eq!(buf.read_exact(2).await.unwrap(), b"xy");
    }

    #[tokio::test]
    async fn read_exact_short_read_on_eof() {
        let mut input: &[u8] = b"abc";
        let mut buf = ByteBuffer::new(&mut input, 2, 1024);
        let out = buf.read_exact(10).await.unwrap();
        assert_eq!(out, b"abc");
    }

    #[tokio::test]
    async fn refill_fails_past_cap() {
        let data = vec![b'a'; 64];
        let mut input: &[u8] = &data;
        let mut buf = ByteBuffer::new(&mut input, 16, 32);

        let err = buf.read_until(b'\n').await.unwrap_err();
        assert!(matches!(err, BufferError::Overflow { limit: 32 }));
        assert_eq!(buf.total_read(), 32);
    }
}
