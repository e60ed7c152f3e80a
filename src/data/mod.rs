//! Data layer: snapshot model, registry store, durable storage
//!
//! This module owns everything that outlives a single event: the saved
//! window model, the four cross-referenced registries, and the whole-state
//! blob storage they are flushed to.

mod models;
mod registry;
mod storage;

pub use models::{SavedTab, SavedWindow};
pub use registry::{PersistedState, Registry, UndoEntry};
pub use storage::{JsonFileStore, MemoryStore, StateStore, StorageError};
