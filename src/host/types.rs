use serde::{Deserialize, Serialize};

/// Host-assigned window identifier.
///
/// Live identifiers are session-local: the host hands out fresh values every
/// time it starts, so these are never meaningful across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

/// Host-assigned tab identifier, session-local like [`WindowId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tab as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTab {
    pub id: TabId,
    /// Window currently owning this tab.
    pub window_id: WindowId,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pinned: bool,
    /// Whether this is the active (foreground) tab of its window.
    #[serde(default)]
    pub active: bool,
}

/// A window as reported by the host, populated with its tabs in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveWindow {
    pub id: WindowId,
    #[serde(default)]
    pub tabs: Vec<LiveTab>,
    #[serde(default)]
    pub focused: bool,
    /// Private-browsing windows are never tracked.
    #[serde(default)]
    pub incognito: bool,
}

impl LiveWindow {
    /// The active tab of this window, if any.
    pub fn active_tab(&self) -> Option<&LiveTab> {
        self.tabs.iter().find(|t| t.active)
    }
}
