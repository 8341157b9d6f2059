//! Worker pool and dispatch loop.
//!
//! # Data Flow
//! ```text
//! accept task ──▶ receive queue ──▶ dispatch loop ──▶ work queue ──▶ worker × N
//!  (bounded)                         (this task)       (bounded)
//! ```
//!
//! # Design Decisions
//! - Both queues hold `count * queue_multiplier` connections
//! - A full work queue blocks the dispatch loop, which fills the receive
//!   queue, which blocks `accept`: backpressure reaches the socket
//! - On shutdown the pool waits for the accept task and every worker

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::config::WorkerConfig;
use crate::http::parser::ParseLimits;
use crate::lifecycle::Shutdown;
use crate::net::{accept_loop, ConnectionTracker, Incoming};
use crate::server::dispatcher::Dispatcher;
use crate::server::worker::Worker;

/// Fixed-size pool of workers fed by the dispatch loop.
pub struct WorkerPool<S, D> {
    dispatcher: Arc<Dispatcher<S, D>>,
    workers: WorkerConfig,
    limits: ParseLimits,
    tracker: ConnectionTracker,
}

impl<S, D> WorkerPool<S, D>
where
    S: Send + 'static,
    D: Send + Sync + 'static,
{
    pub fn new(dispatcher: Arc<Dispatcher<S, D>>, workers: WorkerConfig, limits: ParseLimits) -> Self {
        Self {
            dispatcher,
            workers,
            limits,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Tracker counting connections currently being served.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Serve `listener` until `shutdown` fires and in-flight requests finish.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) {
        let capacity = self.workers.queue_capacity();
        let (recv_tx, mut recv_rx) = mpsc::channel::<Incoming>(capacity);
        let (work_tx, work_rx) = mpsc::channel::<Incoming>(capacity);
        let work_rx = Arc::new(Mutex::new(work_rx));

        let workers: Vec<JoinHandle<()>> = (0..self.workers.count)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    Arc::clone(&work_rx),
                    Arc::clone(&self.dispatcher),
                    self.limits,
                    self.tracker.clone(),
                    shutdown.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect();
        tracing::info!(
            workers = self.workers.count,
            queue_capacity = capacity,
            "Worker pool started"
        );

        let acceptor = tokio::spawn(accept_loop(listener, recv_tx, shutdown.clone()));

        loop {
            let incoming = tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                incoming = recv_rx.recv() => incoming,
            };
            let Some(incoming) = incoming else {
                break;
            };
            tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                sent = work_tx.send(incoming) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            in_flight = self.tracker.active_count(),
            "Shutting down worker pool"
        );
        if let Err(e) = acceptor.await {
            tracing::error!(error = %e, "Accept task failed");
        }
        drop(recv_rx);
        drop(work_tx);
        self.tracker.wait_idle().await;
        tracing::debug!("In-flight connections drained");
        for (id, worker) in workers.into_iter().enumerate() {
            if let Err(e) = worker.await {
                tracing::error!(worker = id, error = %e, "Worker task failed");
            }
        }
        tracing::info!("Worker pool stopped");
    }
}
