//! Workers: take connections off the work queue and serve them.
//!
//! # Responsibilities
//! - Wait for either shutdown or the next queued connection
//! - Parse, dispatch and write exactly one request per connection
//! - Close every taken connection exactly once, on every path
//!
//! # Design Decisions
//! - Shutdown is checked first, so queued connections are not started after it
//! - A connection already taken is always served to completion
//! - Parse failures are closed without a response

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};
use tracing::Instrument;

use crate::http::parser::{read_request, ParseLimits};
use crate::http::writer::write_response;
use crate::lifecycle::Shutdown;
use crate::net::{ConnectionTracker, Incoming};
use crate::server::dispatcher::Dispatcher;

/// Work queue receiver shared by every worker.
pub type WorkQueue = Arc<Mutex<mpsc::Receiver<Incoming>>>;

/// One member of the worker pool.
pub struct Worker<S, D> {
    id: usize,
    queue: WorkQueue,
    dispatcher: Arc<Dispatcher<S, D>>,
    limits: ParseLimits,
    tracker: ConnectionTracker,
    shutdown: Shutdown,
}

impl<S, D> Worker<S, D>
where
    S: Send + 'static,
    D: Send + Sync + 'static,
{
    pub fn new(
        id: usize,
        queue: WorkQueue,
        dispatcher: Arc<Dispatcher<S, D>>,
        limits: ParseLimits,
        tracker: ConnectionTracker,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            id,
            queue,
            dispatcher,
            limits,
            tracker,
            shutdown,
        }
    }

    /// Serve connections until shutdown or until the queue closes.
    pub async fn run(self) {
        tracing::debug!(worker = self.id, "Worker online");
        loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.triggered() => break,
                next = async { self.queue.lock().await.recv().await } => next,
            };
            let Some((stream, peer)) = next else {
                break;
            };

            let guard = self.tracker.track();
            let span = tracing::debug_span!(
                "connection",
                worker = self.id,
                connection_id = %guard.id(),
                peer = %peer,
            );
            serve_connection(stream, peer, &self.dispatcher, &self.limits)
                .instrument(span)
                .await;
            drop(guard);
        }
        tracing::debug!(worker = self.id, "Worker stopped");
    }
}

/// Serve one request on `stream`, then close it.
pub async fn serve_connection<T, S, D>(
    mut stream: T,
    peer: SocketAddr,
    dispatcher: &Dispatcher<S, D>,
    limits: &ParseLimits,
) where
    T: AsyncRead + AsyncWrite + Unpin,
    S: Send + 'static,
    D: Send + Sync + 'static,
{
    let request = match read_request(&mut stream, peer, limits).await {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Could not parse request");
            let _ = stream.shutdown().await;
            return;
        }
    };

    let method = request.method();
    let path = request.path().to_string();
    tracing::debug!(method = %method, path = %path, "Request dispatched");

    let response = dispatcher.dispatch(request).await;
    let status = response.status();
    match write_response(&mut stream, response).await {
        Ok(bytes) => tracing::debug!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            bytes,
            "Response sent"
        ),
        Err(e) => tracing::debug!(error = %e, status = status.as_u16(), "Response write failed"),
    }
    let _ = stream.shutdown().await;
}
