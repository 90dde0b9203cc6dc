//! Debounced background persistence of snapshots.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{error, info, warn};

use crate::storage::PersistenceGateway;
use crate::store::LedgerState;

/// What the sync task has done so far.
///
/// `last_error` persists until a save succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    /// Revision waiting for the debounce window to close.
    pub pending_revision: Option<u64>,
    /// Revision most recently written.
    pub synced_revision: Option<u64>,
    /// Message of the last failed save.
    pub last_error: Option<String>,
}

impl SyncStatus {
    /// True when the last save attempt failed.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.last_error.is_some()
    }

    /// True when nothing is waiting to be written.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.pending_revision.is_none() && self.last_error.is_none()
    }
}

#[derive(Debug)]
enum SyncMessage {
    Snapshot(Arc<LedgerState>),
    Flush(oneshot::Sender<SyncStatus>),
    Shutdown(oneshot::Sender<SyncStatus>),
}

/// Cheap, cloneable sender side of the sync task.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: mpsc::UnboundedSender<SyncMessage>,
    status: watch::Receiver<SyncStatus>,
}

impl SyncHandle {
    /// Queues `snapshot` and restarts the debounce window.
    pub fn schedule(&self, snapshot: Arc<LedgerState>) {
        let revision = snapshot.revision;
        if self.tx.send(SyncMessage::Snapshot(snapshot)).is_err() {
            warn!(revision, "sync task stopped; snapshot not scheduled");
        }
    }

    /// Writes any pending snapshot now.
    pub async fn flush(&self) -> SyncStatus {
        self.request(SyncMessage::Flush).await
    }

    /// Latest status.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified on every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    async fn request(&self, make: fn(oneshot::Sender<SyncStatus>) -> SyncMessage) -> SyncStatus {
        let (reply, response) = oneshot::channel();
        if self.tx.send(make(reply)).is_err() {
            return self.status();
        }
        response.await.unwrap_or_else(|_| self.status())
    }
}

/// Owner of the background sync task.
pub struct SyncScheduler {
    handle: SyncHandle,
    task: JoinHandle<()>,
}

impl SyncScheduler {
    /// Spawns the sync task on the current tokio runtime.
    #[must_use]
    pub fn spawn(
        gateway: Arc<dyn PersistenceGateway>,
        sync_id: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SyncStatus::default());

        let worker = SyncWorker {
            gateway,
            sync_id: sync_id.into(),
            debounce,
            rx,
            status: status_tx,
            pending: None,
        };
        let task = tokio::spawn(worker.run());

        Self {
            handle: SyncHandle {
                tx,
                status: status_rx,
            },
            task,
        }
    }

    /// A handle for scheduling snapshots.
    #[must_use]
    pub fn handle(&self) -> SyncHandle {
        self.handle.clone()
    }

    /// Flushes any pending snapshot and stops the task.
    pub async fn shutdown(self) -> SyncStatus {
        let status = self.handle.request(SyncMessage::Shutdown).await;
        if let Err(e) = self.task.await {
            error!(error = %e, "sync task panicked");
        }
        status
    }
}

enum Wake {
    Message(Option<SyncMessage>),
    Deadline,
}

struct SyncWorker {
    gateway: Arc<dyn PersistenceGateway>,
    sync_id: String,
    debounce: Duration,
    rx: mpsc::UnboundedReceiver<SyncMessage>,
    status: watch::Sender<SyncStatus>,
    pending: Option<Arc<LedgerState>>,
}

impl SyncWorker {
    async fn run(mut self) {
        let mut deadline: Option<Instant> = None;

        loop {
            let wake = match deadline {
                Some(at) => tokio::select! {
                    message = self.rx.recv() => Wake::Message(message),
                    () = sleep_until(at) => Wake::Deadline,
                },
                None => Wake::Message(self.rx.recv().await),
            };

            let message = match wake {
                Wake::Message(message) => message,
                Wake::Deadline => {
                    deadline = None;
                    self.save_pending().await;
                    continue;
                }
            };

            match message {
                Some(SyncMessage::Snapshot(snapshot)) => {
                    let revision = snapshot.revision;
                    self.pending = Some(snapshot);
                    deadline = Some(Instant::now() + self.debounce);
                    self.status
                        .send_modify(|s| s.pending_revision = Some(revision));
                }
                Some(SyncMessage::Flush(reply)) => {
                    deadline = None;
                    self.save_pending().await;
                    let _ = reply.send(self.status.borrow().clone());
                }
                Some(SyncMessage::Shutdown(reply)) => {
                    self.save_pending().await;
                    let _ = reply.send(self.status.borrow().clone());
                    break;
                }
                None => {
                    self.save_pending().await;
                    break;
                }
            }
        }
    }

    async fn save_pending(&mut self) {
        let Some(snapshot) = self.pending.clone() else {
            return;
        };
        let revision = snapshot.revision;

        match self.gateway.save_state(&self.sync_id, &snapshot).await {
            Ok(()) => {
                self.pending = None;
                info!(
                    sync_id = %self.sync_id,
                    revision,
                    backend = self.gateway.name(),
                    "snapshot synced"
                );
                self.status.send_modify(|s| {
                    s.pending_revision = None;
                    s.synced_revision = Some(revision);
                    s.last_error = None;
                });
            }
            Err(e) => {
                // The snapshot stays pending; the next schedule or flush retries it.
                error!(
                    sync_id = %self.sync_id,
                    revision,
                    code = e.error_code(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "snapshot sync failed"
                );
                self.status
                    .send_modify(|s| s.last_error = Some(e.to_string()));
            }
        }
    }
}
