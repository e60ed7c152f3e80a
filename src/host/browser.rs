use async_trait::async_trait;

use crate::host::error::HostError;
use crate::host::types::{LiveTab, LiveWindow, TabId, WindowId};

/// Trait for the window/tab surface of the hosting browser.
///
/// The engine only ever talks to the host through this seam, so tests can
/// substitute [`MockHost`](crate::host::MockHost) and the binary can plug in
/// a wire bridge. All calls are asynchronous and fallible; callers decide
/// per call site whether a failure aborts the operation or is logged and
/// skipped.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// Enumerate all open windows, populated with their tabs in display
    /// order. Enumeration order is stable for the lifetime of a call and is
    /// the tie-break order used during reconciliation.
    async fn list_windows(&self) -> Result<Vec<LiveWindow>, HostError>;

    /// Fetch a single window, populated with its tabs.
    async fn get_window(&self, id: WindowId) -> Result<LiveWindow, HostError>;

    /// The currently focused window, populated with its tabs.
    async fn current_window(&self) -> Result<LiveWindow, HostError>;

    /// Create a window whose tabs load the given URLs, in order. Returns the
    /// new window populated with its freshly created tabs.
    async fn create_window(&self, urls: Vec<String>) -> Result<LiveWindow, HostError>;

    /// Pin or unpin a tab.
    async fn set_tab_pinned(&self, tab: TabId, pinned: bool) -> Result<(), HostError>;

    /// Close a single tab.
    async fn close_tab(&self, tab: TabId) -> Result<(), HostError>;
}

/// Consumer of "this window/tab's saved-state changed" signals.
///
/// The indicator text is the open tab count of the owning window when that
/// window is tracked, and empty otherwise. Implementations render it however
/// they like (a badge, a title suffix); the engine treats every call as
/// best-effort.
#[async_trait]
pub trait IndicatorSink: Send + Sync {
    /// Update the indicator attached to a single tab.
    async fn set_tab_text(&self, tab: TabId, text: &str) -> Result<(), HostError>;

    /// Update the indicator for every tab of a window.
    async fn set_window_text(&self, window: &LiveWindow, text: &str) -> Result<(), HostError>;
}

/// Blank-page URLs the open operation treats as placeholder tabs.
pub const PLACEHOLDER_URLS: &[&str] = &["about:blank", "about:newtab", "chrome://newtab/"];

/// Whether a tab is a blank/new-tab placeholder worth closing before a
/// restore.
pub fn is_placeholder_tab(tab: &LiveTab) -> bool {
    tab.url.is_empty() || PLACEHOLDER_URLS.contains(&tab.url.as_str())
}
