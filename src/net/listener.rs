//! TCP listener and accept loop.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections and push them onto the receive queue
//! - Graceful handling of accept errors
//! - Stop accepting, and close the socket, on shutdown

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::config::ListenerConfig;
use crate::lifecycle::Shutdown;

/// An accepted connection waiting for a worker.
pub type Incoming = (TcpStream, SocketAddr);

/// Pause after a failed accept.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The configured address is not a socket address.
    #[error("invalid bind address `{address}`: {source}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },

    /// Failed to bind to address.
    #[error("failed to bind: {0}")]
    Bind(#[from] std::io::Error),
}

/// Bind a listener to the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let addr: SocketAddr =
        config
            .bind_address
            .parse()
            .map_err(|source| ListenerError::Address {
                address: config.bind_address.clone(),
                source,
            })?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Listener bound");
    Ok(listener)
}

/// Accept connections until shutdown, handing each to `queue`.
///
/// Blocks on a full queue, which is how backpressure reaches `accept`.
/// The listener is dropped, closing the socket, when this returns.
pub async fn accept_loop(listener: TcpListener, queue: mpsc::Sender<Incoming>, shutdown: Shutdown) {
    loop {
        let accepted = tokio::select! {
            _ = shutdown.triggered() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, peer)) => {
                tracing::trace!(peer = %peer, "Connection accepted");
                tokio::select! {
                    _ = shutdown.triggered() => break,
                    sent = queue.send((stream, peer)) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Accept failed");
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
            }
        }
    }
    tracing::debug!("Accept loop stopped");
}
