//! Saved-window operations: save, delete, undo, open
//!
//! The discrete requests a user can make against the engine, as opposed to
//! the host-driven event handlers. Every operation mutates the registry and
//! flushes before returning.

use thiserror::Error;

use crate::core::engine::Engine;
use crate::core::matcher::windows_are_equal;
use crate::data::{SavedWindow, StorageError, UndoEntry};
use crate::host::browser::is_placeholder_tab;
use crate::host::error::HostError;
use crate::host::types::LiveWindow;

/// Error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The named saved window (or undo capture) does not exist.
    #[error("Saved window not found: {0}")]
    NotFound(String),

    /// Durable storage failed; the operation's mutation may not have been
    /// persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A host call the operation cannot proceed without failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl Engine {
    /// Save a live window under a name.
    ///
    /// An empty or already-used name is a silent no-op returning `None`;
    /// callers infer failure from the absence of a snapshot, mirroring how
    /// the UI treats the save form. On success the window is immediately
    /// tracked as open and the stored snapshot is returned.
    pub async fn save_window(
        &mut self,
        window: &LiveWindow,
        name: &str,
    ) -> Result<Option<SavedWindow>, EngineError> {
        if name.is_empty() {
            tracing::debug!("Ignoring save with empty name");
            return Ok(None);
        }
        if self.registry().contains(name) {
            tracing::debug!(name = %name, "Ignoring save with duplicate name");
            return Ok(None);
        }

        let snapshot = SavedWindow::capture(window, name);
        let registry = self.registry_mut();
        registry.names.push(name.to_string());
        registry.snapshots.insert(name.to_string(), snapshot);

        self.mark_window_as_open(window, name).await;
        self.flush().await?;

        tracing::info!(name = %name, tabs = window.tabs.len(), "Saved window");
        Ok(self.registry().snapshots.get(name).cloned())
    }

    /// Delete a saved window.
    ///
    /// Idempotent: deleting a name that is not saved still reports success.
    /// The snapshot survives only in the session-scoped undo buffer.
    pub async fn delete_saved_window(&mut self, name: &str) -> Result<bool, EngineError> {
        let Some(snapshot) = self.registry().snapshots.get(name).cloned() else {
            return Ok(true);
        };

        let was_closed = self.registry().closed.contains_key(name);
        let registry = self.registry_mut();
        let position = registry.remove_name(name).unwrap_or(0);
        registry.undo_buffer.insert(
            name.to_string(),
            UndoEntry {
                snapshot: snapshot.clone(),
                position,
                was_closed,
            },
        );
        registry.snapshots.remove(name);
        registry.closed.remove(name);

        if let Some(live_id) = snapshot.live_id {
            self.registry_mut().live_index.remove(&live_id);
            // The window is no longer tracked; clear its indicator using
            // fresh host data.
            let fetched = self.host().get_window(live_id).await;
            match fetched {
                Ok(window) => self.refresh_window_indicator(&window).await,
                Err(e) => {
                    tracing::warn!(window = %live_id, error = %e, "Failed to clear indicator for deleted window")
                }
            }
        }

        self.flush().await?;
        tracing::info!(name = %name, "Deleted saved window");
        Ok(true)
    }

    /// Reverse a delete performed earlier in this session.
    ///
    /// Restores the name at its original list position (clamped if the list
    /// has shrunk). A window that was open at delete time is only re-tracked
    /// after re-verifying against the host that the window still exists and
    /// still structurally matches; otherwise the snapshot lands in the
    /// closed set and ordinary reconciliation takes over.
    pub async fn undo_delete_saved_window(&mut self, name: &str) -> Result<(), EngineError> {
        let Some(entry) = self.registry_mut().undo_buffer.remove(name) else {
            return Err(EngineError::NotFound(name.to_string()));
        };

        let UndoEntry {
            mut snapshot,
            position,
            was_closed,
        } = entry;

        let live_id = snapshot.live_id.take();
        let registry = self.registry_mut();
        registry.insert_name_at(name, position);
        registry
            .snapshots
            .insert(name.to_string(), snapshot.clone());

        let mut restored_open = false;
        if !was_closed {
            if let Some(id) = live_id {
                let fetched = self.host().get_window(id).await;
                match fetched {
                    Ok(window) if windows_are_equal(&window, &snapshot) => {
                        self.mark_window_as_open(&window, name).await;
                        restored_open = true;
                    }
                    Ok(_) => {
                        tracing::debug!(name = %name, window = %id, "Window no longer matches; restoring as closed")
                    }
                    Err(e) => {
                        tracing::debug!(name = %name, window = %id, error = %e, "Window gone; restoring as closed")
                    }
                }
            }
        }
        if !restored_open {
            self.registry_mut()
                .closed
                .insert(name.to_string(), snapshot);
        }

        self.flush().await?;
        tracing::info!(name = %name, reopened = restored_open, "Restored deleted window");
        Ok(())
    }

    /// Reopen a saved window as a live one.
    ///
    /// Creates a window with the snapshot's URLs in order, tracks it, pins
    /// tabs best-effort, and moves the name to the most-recently-used end of
    /// the list. Window creation failure is fatal to the call; every other
    /// side effect (closing a blank placeholder tab first, pinning) is
    /// logged and skipped on failure.
    pub async fn open_window(
        &mut self,
        name: &str,
    ) -> Result<(SavedWindow, LiveWindow), EngineError> {
        let snapshot = self
            .registry()
            .snapshots
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(name.to_string()))?;

        // Cosmetic: a lone blank tab in the focused window is what the user
        // sees right before asking for a restore; close it so the restored
        // window doesn't leave an empty one behind.
        let current = self.host().current_window().await;
        match current {
            Ok(current) => {
                if let Some(tab) = current.active_tab() {
                    if is_placeholder_tab(tab) {
                        if let Err(e) = self.host().close_tab(tab.id).await {
                            tracing::warn!(tab = %tab.id, error = %e, "Failed to close placeholder tab");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "No focused window to check for a placeholder tab")
            }
        }

        let window = self.host().create_window(snapshot.restore_urls()).await?;

        // If the name somehow already tracked a window, that entry is stale
        // now; the new window owns the name.
        if let Some(old_id) = snapshot.live_id {
            self.registry_mut().live_index.remove(&old_id);
        }
        self.mark_window_as_open(&window, name).await;

        for (saved_tab, live_tab) in snapshot.tabs.iter().zip(window.tabs.iter()) {
            if saved_tab.pinned {
                if let Err(e) = self.host().set_tab_pinned(live_tab.id, true).await {
                    tracing::warn!(tab = %live_tab.id, error = %e, "Failed to pin restored tab");
                }
            }
        }

        self.registry_mut().move_name_to_end(name);
        self.flush().await?;

        let snapshot = self
            .registry()
            .snapshots
            .get(name)
            .cloned()
            .unwrap_or(snapshot);
        tracing::info!(name = %name, window = %window.id, "Opened saved window");
        Ok((snapshot, window))
    }
}
