//! Data models for saved windows and their tabs

use serde::{Deserialize, Serialize};

use crate::host::types::{LiveWindow, WindowId};

/// A tab as captured into a snapshot.
///
/// Records are immutable once captured: every resnapshot of a window builds
/// fresh ones from the live tab list rather than patching in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedTab {
    pub url: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub title: String,
}

/// A saved window: an ordered tab list under a user-chosen name.
///
/// `live_id` is present iff the snapshot currently corresponds to an open
/// window. It is host-assigned and session-local, so whatever value was
/// flushed before a restart is stale and gets cleared during startup
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWindow {
    pub name: String,
    pub tabs: Vec<SavedTab>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_id: Option<WindowId>,
    #[serde(default)]
    pub focused: bool,
}

impl SavedWindow {
    /// Capture a fresh snapshot of a live window under the given name.
    ///
    /// Only the fields we need survive the capture. The live window id is
    /// not recorded here; marking a snapshot open is a separate, explicit
    /// step.
    pub fn capture(window: &LiveWindow, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tabs: window
                .tabs
                .iter()
                .map(|t| SavedTab {
                    url: t.url.clone(),
                    pinned: t.pinned,
                    title: t.title.clone(),
                })
                .collect(),
            live_id: None,
            focused: window.focused,
        }
    }

    /// Replace the tab list and focus flag with the live window's current
    /// state, keeping name and open/closed identity intact.
    pub fn resnapshot(&mut self, window: &LiveWindow) {
        let mut fresh = Self::capture(window, self.name.clone());
        fresh.live_id = self.live_id;
        *self = fresh;
    }

    /// Whether this snapshot currently corresponds to an open window.
    pub fn is_open(&self) -> bool {
        self.live_id.is_some()
    }

    /// The URLs to restore, in order. Tabs captured without a URL fall back
    /// to a blank placeholder.
    pub fn restore_urls(&self) -> Vec<String> {
        self.tabs
            .iter()
            .map(|t| {
                if t.url.is_empty() {
                    "about:blank".to_string()
                } else {
                    t.url.clone()
                }
            })
            .collect()
    }
}
