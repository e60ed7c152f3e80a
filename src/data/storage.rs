//! Durable storage for the registry
//!
//! The engine reads and writes whole-state blobs: one [`PersistedState`] per
//! flush, nothing incremental. Implementations only need to make that blob
//! durable; [`JsonFileStore`] keeps it in a JSON file, [`MemoryStore`] keeps
//! it in memory for tests and ephemeral runs.

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use crate::data::registry::PersistedState;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Whole-state blob storage.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the persisted state. A store with nothing saved yet returns the
    /// empty state.
    async fn load(&self) -> Result<PersistedState, StorageError>;

    /// Atomically replace the persisted state.
    async fn save(&self, state: &PersistedState) -> Result<(), StorageError>;
}

/// JSON file-backed store.
///
/// Saves write to a sibling temp file and rename into place, so a crash
/// mid-write leaves the previous blob intact.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> Result<PersistedState, StorageError> {
        if !self.path.exists() {
            return Ok(PersistedState::default());
        }

        let contents = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents) {
            Ok(state) => Ok(state),
            Err(e) => {
                // A corrupt blob is recoverable: start empty and let the
                // next flush rewrite it.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "State file is unreadable; starting with empty state"
                );
                Ok(PersistedState::default())
            }
        }
    }

    async fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<PersistedState>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with pre-existing state, as if a previous session had
    /// flushed it.
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(state),
            saves: Mutex::new(0),
        }
    }

    /// Number of flushes performed, for asserting that operations persist.
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }

    /// The most recently flushed state.
    pub fn current(&self) -> PersistedState {
        self.state.lock().clone()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<PersistedState, StorageError> {
        Ok(self.state.lock().clone())
    }

    async fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        *self.state.lock() = state.clone();
        *self.saves.lock() += 1;
        Ok(())
    }
}
