//! Persistence collaborator contract and its implementations.
//!
//! The core only ever reads and writes whole documents by key. Business logic
//! never touches storage directly: the [`writer::DebouncedWriter`] subscribes
//! to store snapshots and persists them.

mod config;
pub mod database;
pub mod memory;
pub mod writer;

pub use config::{Config, LoggingConfig, PersistenceConfig, TickConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use writer::{DebouncedWriter, WriterStats};

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::warn;

use crate::error::{Result, StorageError};
use crate::store::AppState;

/// Document key for the cycle group list.
pub const GROUPS_KEY: &str = "cycle_groups";
/// Document key for the milestone list.
pub const MILESTONES_KEY: &str = "milestones";
/// Document key for the daily-scope list.
pub const DAILY_KEY: &str = "daily";

/// Whole-document key/value persistence.
pub trait DocumentStore: Send + Sync {
    /// Read a document. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a document wholesale.
    fn set(&self, key: &str, document: &str) -> Result<(), StorageError>;

    /// Keys changed by other sessions or a sync collaborator.
    /// `None` when the backend cannot notify.
    fn subscribe(&self) -> Option<broadcast::Receiver<String>> {
        None
    }
}

/// Returns `~/.config/cadence[-dev]/`.
///
/// `CADENCE_DATA_DIR` overrides the location outright; otherwise
/// `CADENCE_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("CADENCE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("CADENCE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("cadence-dev")
            } else {
                base_dir.join("cadence")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

fn load_slice<T: DeserializeOwned + Default>(store: &dyn DocumentStore, key: &str) -> T {
    match store.get(key) {
        Ok(Some(doc)) => match serde_json::from_str(&doc) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "discarding unreadable document");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "failed to read document, starting empty");
            T::default()
        }
    }
}

/// Load the whole state. Each slice that is missing, unreadable or malformed
/// falls back to its default independently; this never fails.
pub fn load_state(store: &dyn DocumentStore) -> AppState {
    AppState {
        groups: load_slice(store, GROUPS_KEY),
        milestones: load_slice(store, MILESTONES_KEY),
        daily: load_slice(store, DAILY_KEY),
    }
}

/// Serialize each slice of `state` as `(key, document)` pairs.
pub fn encode_state(state: &AppState) -> Result<[(&'static str, String); 3]> {
    Ok([
        (GROUPS_KEY, serde_json::to_string(&state.groups)?),
        (MILESTONES_KEY, serde_json::to_string(&state.milestones)?),
        (DAILY_KEY, serde_json::to_string(&state.daily)?),
    ])
}

/// Write every slice immediately. Used by short-lived callers that cannot
/// wait for a debounce window.
pub fn save_state(store: &dyn DocumentStore, state: &AppState) -> Result<()> {
    for (key, doc) in encode_state(state)? {
        store.set(key, &doc)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::DailyState;

    #[test]
    fn malformed_slices_fall_back_independently() {
        let store = MemoryStore::new();
        store.set(GROUPS_KEY, "{not json").unwrap();
        store
            .set(DAILY_KEY, r#"{"day_key":"2024-02-01","all_time_completed":4}"#)
            .unwrap();

        let state = load_state(&store);
        assert!(state.groups.is_empty());
        assert!(state.milestones.is_empty());
        assert_eq!(state.daily.all_time_completed, 4);
        assert_eq!(state.daily.day_key.as_deref(), Some("2024-02-01"));
    }

    #[test]
    fn wrong_shape_is_treated_as_malformed() {
        let store = MemoryStore::new();
        store.set(DAILY_KEY, "[1, 2, 3]").unwrap();
        assert_eq!(load_state(&store).daily, DailyState::default());
    }

    #[test]
    fn save_then_load_restores_state() {
        let store = MemoryStore::new();
        let mut state = AppState::default();
        state.daily.add_todo("Pay rent").unwrap();
        save_state(&store, &state).unwrap();
        assert_eq!(load_state(&store), state);
    }

    #[test]
    fn data_dir_honours_override() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("nested");
        std::env::set_var("CADENCE_DATA_DIR", &target);
        let dir = data_dir().unwrap();
        std::env::remove_var("CADENCE_DATA_DIR");
        assert_eq!(dir, target);
        assert!(target.is_dir());
    }
}
