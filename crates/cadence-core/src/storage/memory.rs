//! In-process document store.
//!
//! Clones share one document map and one change channel, so two
//! [`crate::Store`] sessions backed by clones of the same `MemoryStore`
//! observe each other's writes the way two devices would through a sync
//! service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use super::DocumentStore;
use crate::error::StorageError;

const CHANGE_CAPACITY: usize = 64;

struct Inner {
    docs: Mutex<HashMap<String, String>>,
    changes: broadcast::Sender<String>,
    writes: AtomicUsize,
}

#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                docs: Mutex::new(HashMap::new()),
                changes,
                writes: AtomicUsize::new(0),
            }),
        }
    }

    /// Total number of `set` calls across all clones.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let docs = self.inner.docs.lock().unwrap_or_else(|e| e.into_inner());
        Ok(docs.get(key).cloned())
    }

    fn set(&self, key: &str, document: &str) -> Result<(), StorageError> {
        {
            let mut docs = self.inner.docs.lock().unwrap_or_else(|e| e.into_inner());
            docs.insert(key.to_string(), document.to_string());
        }
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        // No subscribers is fine.
        let _ = self.inner.changes.send(key.to_string());
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<String>> {
        Some(self.inner.changes.subscribe())
    }
}
