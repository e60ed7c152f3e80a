//! Registry store: the four cross-referenced collections
//!
//! Process-wide state for the reconciliation engine. A saved window is
//! either open (tracked through `live_index`) or closed (parked in
//! `closed`), never both; `names` carries display order with the most
//! recently used name last.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::models::SavedWindow;
use crate::host::types::WindowId;

/// What delete captured, so undo can put things back.
///
/// Session-scoped: entries never hit durable storage and are dropped when
/// the process ends.
#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub snapshot: SavedWindow,
    /// Index the name held in `names` at delete time.
    pub position: usize,
    /// Whether the window was in the closed set (as opposed to open).
    pub was_closed: bool,
}

/// The durable form of the registry: exactly the four top-level keys the
/// engine reads and writes as one unit per flush.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub saved_window_names: Vec<String>,
    #[serde(default)]
    pub saved_windows: HashMap<String, SavedWindow>,
    #[serde(default)]
    pub window_id_to_name: HashMap<WindowId, String>,
    #[serde(default)]
    pub closed_windows: HashMap<String, SavedWindow>,
}

/// In-memory registry the engine operates on.
#[derive(Debug, Default)]
pub struct Registry {
    /// Saved names, each at most once, most-recently-used last.
    pub names: Vec<String>,
    /// All saved windows, keyed by name.
    pub snapshots: HashMap<String, SavedWindow>,
    /// Open window id -> saved name.
    pub live_index: HashMap<WindowId, String>,
    /// Saved windows that are not currently open, keyed by name.
    pub closed: HashMap<String, SavedWindow>,
    /// Delete captures awaiting a possible undo. Never persisted.
    pub undo_buffer: HashMap<String, UndoEntry>,
}

impl Registry {
    pub fn from_persisted(state: PersistedState) -> Self {
        Self {
            names: state.saved_window_names,
            snapshots: state.saved_windows,
            live_index: state.window_id_to_name,
            closed: state.closed_windows,
            undo_buffer: HashMap::new(),
        }
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            saved_window_names: self.names.clone(),
            saved_windows: self.snapshots.clone(),
            window_id_to_name: self.live_index.clone(),
            closed_windows: self.closed.clone(),
        }
    }

    /// Drop every recorded live identifier. Run at startup: whatever ids the
    /// previous session flushed belong to windows that no longer exist.
    pub fn clear_live_index(&mut self) {
        self.live_index.clear();
        for snapshot in self.snapshots.values_mut() {
            snapshot.live_id = None;
        }
    }

    /// Remove names with no snapshot and snapshots with no name.
    ///
    /// A mismatch is a recoverable data-integrity anomaly (an interrupted
    /// flush, a hand-edited state file); it is repaired and logged, never
    /// surfaced. Returns the number of names dropped.
    pub fn sweep_orphans(&mut self) -> usize {
        let before = self.names.len();
        let snapshots = &self.snapshots;
        self.names.retain(|name| {
            let found = snapshots.contains_key(name);
            if !found {
                tracing::error!(name = %name, "Saved window missing from storage; dropping name");
            }
            found
        });
        let names = &self.names;
        self.snapshots.retain(|name, _| names.contains(name));
        self.closed.retain(|name, _| names.contains(name));
        before - self.names.len()
    }

    /// The saved name tracking this open window, if any.
    pub fn name_for_window(&self, id: WindowId) -> Option<&str> {
        self.live_index.get(&id).map(String::as_str)
    }

    /// Whether a name is saved at all.
    pub fn contains(&self, name: &str) -> bool {
        self.snapshots.contains_key(name)
    }

    /// Whether a saved name currently tracks an open window.
    pub fn is_open(&self, name: &str) -> bool {
        self.snapshots
            .get(name)
            .map(|s| s.is_open())
            .unwrap_or(false)
    }

    /// Remove a name from the order list, returning the position it held.
    pub fn remove_name(&mut self, name: &str) -> Option<usize> {
        let position = self.names.iter().position(|n| n == name)?;
        self.names.remove(position);
        Some(position)
    }

    /// Reinsert a name at a previous position, clamped to the current
    /// length if the list has shrunk since.
    pub fn insert_name_at(&mut self, name: impl Into<String>, position: usize) {
        let position = position.min(self.names.len());
        self.names.insert(position, name.into());
    }

    /// Move a name to the most-recently-used end of the order list.
    pub fn move_name_to_end(&mut self, name: &str) {
        if self.remove_name(name).is_some() {
            self.names.push(name.to_string());
        }
    }

    /// Check the cross-reference invariants, returning a description of the
    /// first violation found. Exercised by tests after every scenario.
    pub fn validate(&self) -> Result<(), String> {
        for name in &self.names {
            if !self.snapshots.contains_key(name) {
                return Err(format!("name {name:?} has no snapshot"));
            }
        }
        if self.names.len() != self.snapshots.len() {
            return Err(format!(
                "{} names but {} snapshots",
                self.names.len(),
                self.snapshots.len()
            ));
        }
        for (id, name) in &self.live_index {
            match self.snapshots.get(name) {
                None => return Err(format!("live index entry {id} -> {name:?} has no snapshot")),
                Some(snapshot) if snapshot.live_id != Some(*id) => {
                    return Err(format!(
                        "snapshot {name:?} live_id {:?} disagrees with live index id {id}",
                        snapshot.live_id
                    ));
                }
                Some(_) => {}
            }
            if self.closed.contains_key(name) {
                return Err(format!("{name:?} is both open and closed"));
            }
        }
        for name in self.closed.keys() {
            if !self.snapshots.contains_key(name) {
                return Err(format!("closed entry {name:?} has no snapshot"));
            }
        }
        Ok(())
    }
}
