//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use pilot_http::{Application, ServerConfig, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// Upper bound for any single network step in tests.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Trigger shutdown and wait for `serve` to return.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(STEP_TIMEOUT, self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked");
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Loopback config with a small pool and quiet startup.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.workers.count = 4;
    config.observability.silent = true;
    config
}

/// Bind `app` and serve it in the background.
pub async fn spawn<S, D>(app: Application<S, D>) -> TestServer
where
    S: Send + 'static,
    D: Send + Sync + 'static,
{
    let server = app.bind(Shutdown::new()).await.expect("bind failed");
    let addr = server.local_addr();
    let shutdown = server.shutdown_handle();
    let handle = tokio::spawn(server.serve());
    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Send raw bytes, half-close, and read until the server closes.
pub async fn send_raw(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect failed");
    stream.write_all(raw).await.expect("write failed");
    stream.shutdown().await.expect("half-close failed");
    read_all(&mut stream).await
}

/// Read until EOF, bounded by [`STEP_TIMEOUT`].
pub async fn read_all(stream: &mut TcpStream) -> String {
    let mut out = Vec::new();
    tokio::time::timeout(STEP_TIMEOUT, stream.read_to_end(&mut out))
        .await
        .expect("server did not close the connection")
        .expect("read failed");
    String::from_utf8_lossy(&out).into_owned()
}

/// Status code from a raw response.
pub fn status_of(raw: &str) -> u16 {
    raw.split(' ')
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("no status line")
}

/// Value of the first header named `name` (case-insensitive).
pub fn header_of<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    let head = raw.split("\r\n\r\n").next()?;
    head.split("\r\n").skip(1).find_map(|line| {
        let (key, value) = line.split_once(": ")?;
        key.eq_ignore_ascii_case(name).then_some(value)
    })
}

/// Body of a raw response.
pub fn body_of(raw: &str) -> &str {
    raw.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
}
