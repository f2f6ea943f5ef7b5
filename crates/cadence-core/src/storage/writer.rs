//! Debounced persistence adapter.
//!
//! Subscribes to the store's snapshot channel and writes the latest snapshot
//! once the channel has been quiet for the debounce window. A new snapshot
//! inside the window restarts it, so a burst of mutations produces a single
//! write of the last state. Only slices whose serialized form changed since
//! the previous write are sent to the backend.
//!
//! When the store is dropped the writer flushes whatever is pending and
//! exits.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{encode_state, DocumentStore};
use crate::store::AppState;

/// Counters reported when the writer exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Debounce windows that ended in a flush.
    pub flushes: usize,
    /// Individual documents written.
    pub documents_written: usize,
    /// Documents whose write failed.
    pub failures: usize,
}

pub struct DebouncedWriter {
    store: Arc<dyn DocumentStore>,
    debounce: Duration,
    /// Last document written per key.
    written: HashMap<&'static str, String>,
    stats: WriterStats,
}

impl DebouncedWriter {
    pub fn new(store: Arc<dyn DocumentStore>, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            written: HashMap::new(),
            stats: WriterStats::default(),
        }
    }

    /// Spawn the writer on the current tokio runtime.
    ///
    /// The snapshot current at spawn time is treated as already persisted;
    /// anything published after it is written.
    pub fn spawn(mut self, rx: watch::Receiver<Arc<AppState>>) -> JoinHandle<WriterStats> {
        let initial = rx.borrow().clone();
        self.remember(&initial);
        tokio::spawn(self.run(rx))
    }

    async fn run(mut self, mut rx: watch::Receiver<Arc<AppState>>) -> WriterStats {
        loop {
            if rx.changed().await.is_err() {
                break;
            }
            let closed = self.wait_for_quiet(&mut rx).await;
            let snapshot = rx.borrow_and_update().clone();
            self.flush(&snapshot);
            if closed {
                break;
            }
        }
        debug!(stats = ?self.stats, "persistence writer stopped");
        self.stats
    }

    /// Returns `true` if the channel closed while waiting.
    async fn wait_for_quiet(&self, rx: &mut watch::Receiver<Arc<AppState>>) -> bool {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.debounce) => return false,
                changed = rx.changed() => {
                    if changed.is_err() {
                        return true;
                    }
                }
            }
        }
    }

    fn remember(&mut self, state: &AppState) {
        if let Ok(docs) = encode_state(state) {
            for (key, doc) in docs {
                self.written.insert(key, doc);
            }
        }
    }

    fn flush(&mut self, state: &AppState) {
        let docs = match encode_state(state) {
            Ok(docs) => docs,
            Err(e) => {
                warn!(error = %e, "failed to encode state, skipping write");
                self.stats.failures += 1;
                return;
            }
        };
        self.stats.flushes += 1;
        for (key, doc) in docs {
            if self.written.get(key) == Some(&doc) {
                continue;
            }
            match self.store.set(key, &doc) {
                Ok(()) => {
                    self.stats.documents_written += 1;
                    self.written.insert(key, doc);
                }
                Err(e) => {
                    // Left out of `written` so the next flush retries it.
                    warn!(key, error = %e, "failed to persist document");
                    self.stats.failures += 1;
                }
            }
        }
    }
}
