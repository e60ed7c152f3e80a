//! Mock host for deterministic testing
//!
//! Implements [`BrowserHost`] and [`IndicatorSink`] over an in-memory window
//! table, without any real browser attached. Tests mutate the table through
//! the helper methods, feed the matching [`HostEvent`]s to the engine, and
//! assert on captured indicator updates.
//!
//! # Example
//! ```no_run
//! use tabvault::host::MockHost;
//!
//! let host = MockHost::new();
//! let win = host.open_window(&["https://a.com", "https://b.com"]);
//! host.focus_window(win.id);
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::host::browser::{BrowserHost, IndicatorSink};
use crate::host::error::HostError;
use crate::host::events::HostEvent;
use crate::host::types::{LiveTab, LiveWindow, TabId, WindowId};

/// A single captured indicator update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorUpdate {
    Tab { tab: TabId, text: String },
    Window { window: WindowId, text: String },
}

#[derive(Default)]
struct MockState {
    /// Open windows in enumeration order.
    windows: Vec<LiveWindow>,
    next_window_id: u64,
    next_tab_id: u64,
    /// Captured indicator updates, in call order.
    indicator_updates: Vec<IndicatorUpdate>,
    /// Whether create_window should fail.
    fail_create: bool,
}

/// In-memory host for tests.
#[derive(Clone, Default)]
pub struct MockHost {
    state: Arc<Mutex<MockState>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure `create_window` to fail with [`HostError::CallFailed`].
    pub fn failing_create(self) -> Self {
        self.state.lock().fail_create = true;
        self
    }

    /// Open a window with one tab per URL and return it. The first window
    /// opened gains focus.
    pub fn open_window(&self, urls: &[&str]) -> LiveWindow {
        self.open_window_with(urls, false)
    }

    /// Open an incognito window with one tab per URL and return it.
    pub fn open_incognito_window(&self, urls: &[&str]) -> LiveWindow {
        self.open_window_with(urls, true)
    }

    fn open_window_with(&self, urls: &[&str], incognito: bool) -> LiveWindow {
        let mut state = self.state.lock();
        state.next_window_id += 1;
        let window_id = WindowId(state.next_window_id);

        let tabs = urls
            .iter()
            .enumerate()
            .map(|(i, url)| {
                state.next_tab_id += 1;
                LiveTab {
                    id: TabId(state.next_tab_id),
                    window_id,
                    url: url.to_string(),
                    title: String::new(),
                    pinned: false,
                    active: i == 0,
                }
            })
            .collect();

        let window = LiveWindow {
            id: window_id,
            tabs,
            focused: state.windows.is_empty(),
            incognito,
        };
        state.windows.push(window.clone());
        window
    }

    /// Remove a window and all its tabs, returning the corresponding event.
    pub fn close_window(&self, id: WindowId) -> HostEvent {
        self.state.lock().windows.retain(|w| w.id != id);
        HostEvent::WindowRemoved { window_id: id }
    }

    /// Move focus to a window (or away from the browser with `None`),
    /// returning the corresponding event.
    pub fn focus_window(&self, id: impl Into<Option<WindowId>>) -> HostEvent {
        let id = id.into();
        let mut state = self.state.lock();
        for window in &mut state.windows {
            window.focused = Some(window.id) == id;
        }
        HostEvent::WindowFocusChanged { window_id: id }
    }

    /// Navigate an existing tab to a new URL, returning the corresponding
    /// event.
    pub fn navigate_tab(&self, tab: TabId, url: &str) -> HostEvent {
        let mut state = self.state.lock();
        for window in &mut state.windows {
            if let Some(t) = window.tabs.iter_mut().find(|t| t.id == tab) {
                t.url = url.to_string();
                return HostEvent::TabUpdated {
                    tab_id: tab,
                    window_id: window.id,
                };
            }
        }
        panic!("navigate_tab: tab {} not found", tab);
    }

    /// Append a new tab to a window, returning the tab and the corresponding
    /// event.
    pub fn add_tab(&self, window_id: WindowId, url: &str) -> (LiveTab, HostEvent) {
        let mut state = self.state.lock();
        state.next_tab_id += 1;
        let tab = LiveTab {
            id: TabId(state.next_tab_id),
            window_id,
            url: url.to_string(),
            title: String::new(),
            pinned: false,
            active: false,
        };
        let window = state
            .windows
            .iter_mut()
            .find(|w| w.id == window_id)
            .unwrap_or_else(|| panic!("add_tab: window {} not found", window_id));
        window.tabs.push(tab.clone());
        let event = HostEvent::TabUpdated {
            tab_id: tab.id,
            window_id,
        };
        (tab, event)
    }

    /// Close a single tab, returning the corresponding event.
    pub fn remove_tab(&self, tab: TabId) -> HostEvent {
        let mut state = self.state.lock();
        for window in &mut state.windows {
            if let Some(pos) = window.tabs.iter().position(|t| t.id == tab) {
                window.tabs.remove(pos);
                return HostEvent::TabRemoved {
                    tab_id: tab,
                    window_id: window.id,
                    is_window_closing: false,
                };
            }
        }
        panic!("remove_tab: tab {} not found", tab);
    }

    /// Move a tab between windows, returning the detach and attach events in
    /// dispatch order.
    pub fn move_tab(&self, tab: TabId, to: WindowId) -> (HostEvent, HostEvent) {
        let mut state = self.state.lock();
        let mut moved = None;
        let mut old_window_id = None;
        for window in &mut state.windows {
            if let Some(pos) = window.tabs.iter().position(|t| t.id == tab) {
                old_window_id = Some(window.id);
                moved = Some(window.tabs.remove(pos));
                break;
            }
        }
        let mut tab_record = moved.unwrap_or_else(|| panic!("move_tab: tab {} not found", tab));
        let old_window_id = old_window_id.unwrap();
        tab_record.window_id = to;
        let target = state
            .windows
            .iter_mut()
            .find(|w| w.id == to)
            .unwrap_or_else(|| panic!("move_tab: window {} not found", to));
        target.tabs.push(tab_record);

        (
            HostEvent::TabDetached {
                tab_id: tab,
                old_window_id,
            },
            HostEvent::TabAttached {
                tab_id: tab,
                window_id: to,
            },
        )
    }

    /// Snapshot of a window's current state, for assertions.
    pub fn window(&self, id: WindowId) -> Option<LiveWindow> {
        self.state.lock().windows.iter().find(|w| w.id == id).cloned()
    }

    /// All captured indicator updates, in call order.
    pub fn indicator_updates(&self) -> Vec<IndicatorUpdate> {
        self.state.lock().indicator_updates.clone()
    }

    /// Drop captured indicator updates accumulated so far.
    pub fn clear_indicator_updates(&self) {
        self.state.lock().indicator_updates.clear();
    }
}

#[async_trait]
impl BrowserHost for MockHost {
    async fn list_windows(&self) -> Result<Vec<LiveWindow>, HostError> {
        Ok(self.state.lock().windows.clone())
    }

    async fn get_window(&self, id: WindowId) -> Result<LiveWindow, HostError> {
        self.state
            .lock()
            .windows
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or(HostError::WindowNotFound(id))
    }

    async fn current_window(&self) -> Result<LiveWindow, HostError> {
        let state = self.state.lock();
        state
            .windows
            .iter()
            .find(|w| w.focused)
            .or_else(|| state.windows.first())
            .cloned()
            .ok_or_else(|| HostError::CallFailed("no windows open".to_string()))
    }

    async fn create_window(&self, urls: Vec<String>) -> Result<LiveWindow, HostError> {
        if self.state.lock().fail_create {
            return Err(HostError::CallFailed("window creation failed".to_string()));
        }
        let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
        Ok(self.open_window(&url_refs))
    }

    async fn set_tab_pinned(&self, tab: TabId, pinned: bool) -> Result<(), HostError> {
        let mut state = self.state.lock();
        for window in &mut state.windows {
            if let Some(t) = window.tabs.iter_mut().find(|t| t.id == tab) {
                t.pinned = pinned;
                return Ok(());
            }
        }
        Err(HostError::TabNotFound(tab))
    }

    async fn close_tab(&self, tab: TabId) -> Result<(), HostError> {
        let mut state = self.state.lock();
        for window in &mut state.windows {
            if let Some(pos) = window.tabs.iter().position(|t| t.id == tab) {
                window.tabs.remove(pos);
                return Ok(());
            }
        }
        Err(HostError::TabNotFound(tab))
    }
}

#[async_trait]
impl IndicatorSink for MockHost {
    async fn set_tab_text(&self, tab: TabId, text: &str) -> Result<(), HostError> {
        self.state.lock().indicator_updates.push(IndicatorUpdate::Tab {
            tab,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn set_window_text(&self, window: &LiveWindow, text: &str) -> Result<(), HostError> {
        self.state
            .lock()
            .indicator_updates
            .push(IndicatorUpdate::Window {
                window: window.id,
                text: text.to_string(),
            });
        Ok(())
    }
}
