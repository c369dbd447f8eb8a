//! One-shot event delivery.
//!
//! Events are queued and handed to exactly one consumer; once received they
//! are gone, so a consumer that detaches and reattaches never sees an old
//! event again.

use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use crate::error::UserError;
use crate::model::EntryId;
use std::path::PathBuf;
use std::time::Duration;

/// Notifications emitted by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEvent {
    Error(UserError),
    /// A recording finished and is waiting to be saved as an entry
    RecordingFinished { file: PathBuf, elapsed: Duration },
    EntrySaved { id: EntryId },
}

pub struct EventChannel<E> {
    tx: mpsc::Sender<E>,
    rx: Mutex<mpsc::Receiver<E>>,
}

impl<E: Send> EventChannel<E> {
    pub fn buffered(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Queue without waiting. Returns false (and logs) when the buffer is
    /// full and the event was dropped.
    pub fn emit(&self, event: E) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping event: {}", e);
                false
            }
        }
    }

    /// Queue, waiting for buffer space.
    pub async fn send(&self, event: E) {
        // The receiver lives as long as `self`, so this cannot fail
        let _ = self.tx.send(event).await;
    }

    /// Next event. Concurrent callers are served one at a time.
    pub async fn next(&self) -> Option<E> {
        self.rx.lock().await.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_next(&self) -> Option<E> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }
}
