use serde::{Deserialize, Serialize};

use crate::host::types::{LiveWindow, TabId, WindowId};

/// Unified lifecycle event type emitted by the host.
///
/// Every event the engine reacts to arrives through this enum, decoupling the
/// reconciliation logic from any particular host binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum HostEvent {
    /// A window was created (populated with its tabs).
    WindowCreated { window: LiveWindow },

    /// A window was removed along with all its tabs.
    WindowRemoved { window_id: WindowId },

    /// Focus moved to another window, or away from the browser entirely
    /// (`window_id: None`).
    WindowFocusChanged { window_id: Option<WindowId> },

    /// A tab was created, navigated, or otherwise changed in place.
    TabUpdated { tab_id: TabId, window_id: WindowId },

    /// A tab was closed. `is_window_closing` is set when the removal is a
    /// side effect of the whole window going away.
    TabRemoved {
        tab_id: TabId,
        window_id: WindowId,
        is_window_closing: bool,
    },

    /// A tab became the active tab of its window.
    TabActivated { tab_id: TabId, window_id: WindowId },

    /// A tab was attached to a window (second half of a move between windows).
    TabAttached { tab_id: TabId, window_id: WindowId },

    /// A tab was detached from a window (first half of a move between windows).
    TabDetached {
        tab_id: TabId,
        old_window_id: WindowId,
    },
}

impl HostEvent {
    /// Get a human-readable event type name for display
    pub fn event_type_name(&self) -> &'static str {
        match self {
            HostEvent::WindowCreated { .. } => "WindowCreated",
            HostEvent::WindowRemoved { .. } => "WindowRemoved",
            HostEvent::WindowFocusChanged { .. } => "WindowFocusChanged",
            HostEvent::TabUpdated { .. } => "TabUpdated",
            HostEvent::TabRemoved { .. } => "TabRemoved",
            HostEvent::TabActivated { .. } => "TabActivated",
            HostEvent::TabAttached { .. } => "TabAttached",
            HostEvent::TabDetached { .. } => "TabDetached",
        }
    }
}
