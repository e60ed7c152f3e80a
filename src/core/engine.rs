//! Reconciliation engine
//!
//! Owns the in-memory registry and every component seam: durable storage,
//! the browser host, and the indicator sink. All engine operations take
//! `&mut self`, so registry mutations cannot interleave; each one ends with
//! a flush before acknowledging, making durable state the single source of
//! truth across restarts.

use std::sync::Arc;

use crate::core::matcher::windows_are_equal;
use crate::core::ops::EngineError;
use crate::data::{Registry, StateStore};
use crate::host::browser::{BrowserHost, IndicatorSink};
use crate::host::events::HostEvent;
use crate::host::types::{LiveWindow, TabId, WindowId};

/// The reconciliation engine.
pub struct Engine {
    registry: Registry,
    store: Arc<dyn StateStore>,
    host: Arc<dyn BrowserHost>,
    indicators: Arc<dyn IndicatorSink>,
    default_name: String,
}

impl Engine {
    /// Create an engine over the given seams. Call
    /// [`initialize`](Self::initialize) before feeding it events.
    pub fn new(
        store: Arc<dyn StateStore>,
        host: Arc<dyn BrowserHost>,
        indicators: Arc<dyn IndicatorSink>,
    ) -> Self {
        Self {
            registry: Registry::default(),
            store,
            host,
            indicators,
            default_name: crate::core::requests::DEFAULT_WINDOW_NAME.to_string(),
        }
    }

    /// Override the default name offered to the UI for unsaved windows.
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    /// Get the in-memory registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Get a mutable reference to the in-memory registry.
    ///
    /// Mutations through this accessor are not flushed; callers own the
    /// flush that closes their operation.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Get the browser host seam.
    pub fn host(&self) -> &Arc<dyn BrowserHost> {
        &self.host
    }

    /// Get the default name offered to the UI for unsaved windows.
    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Startup reconciliation. Runs once per process start.
    ///
    /// Loads the registry, discards every live identifier recorded by the
    /// previous session, sweeps orphaned names, then walks the saved names
    /// in order trying to claim one open window each: the first window whose
    /// tabs structurally match is resnapshotted and marked open, and is not
    /// reconsidered for later names. `names` order is thus the documented
    /// priority when several saved windows could match the same live one.
    pub async fn initialize(&mut self) -> Result<(), EngineError> {
        let state = self.store.load().await?;
        self.registry = Registry::from_persisted(state);
        self.registry.clear_live_index();
        self.registry.sweep_orphans();

        let windows = match self.host.list_windows().await {
            Ok(windows) => windows,
            Err(e) => {
                tracing::warn!(error = %e, "Window enumeration failed at startup; treating all saved windows as closed");
                Vec::new()
            }
        };

        for name in self.registry.names.clone() {
            // Default assumption: closed, until an open window claims it.
            let Some(snapshot) = self.registry.snapshots.get_mut(&name) else {
                continue;
            };
            snapshot.live_id = None;
            let parked = snapshot.clone();
            self.registry.closed.insert(name.clone(), parked);

            for window in &windows {
                if self.registry.live_index.contains_key(&window.id) {
                    continue; // claimed by an earlier name
                }
                let snapshot = &self.registry.snapshots[&name];
                if windows_are_equal(window, snapshot) {
                    if let Some(snapshot) = self.registry.snapshots.get_mut(&name) {
                        snapshot.resnapshot(window);
                    }
                    self.mark_window_as_open(window, &name).await;
                    break;
                }
            }
        }

        self.flush().await?;
        tracing::info!(
            saved = self.registry.names.len(),
            open = self.registry.live_index.len(),
            "Engine initialized"
        );
        Ok(())
    }

    /// Record that a live window now embodies a saved name.
    ///
    /// Removes the name from the closed set, indexes the window id, stamps
    /// the snapshot's live id, and signals the indicator sink with the
    /// window's tab count. Idempotent; callers flush.
    pub async fn mark_window_as_open(&mut self, window: &LiveWindow, name: &str) {
        self.registry.closed.remove(name);
        self.registry.live_index.insert(window.id, name.to_string());
        if let Some(snapshot) = self.registry.snapshots.get_mut(name) {
            snapshot.live_id = Some(window.id);
        }
        tracing::debug!(name = %name, window = %window.id, "Marked saved window as open");
        self.refresh_window_indicator(window).await;
    }

    /// Write the registry to durable storage.
    pub async fn flush(&mut self) -> Result<(), EngineError> {
        self.store.save(&self.registry.to_persisted()).await?;
        Ok(())
    }

    /// Dispatch a host lifecycle event to its handler.
    pub async fn handle_event(&mut self, event: HostEvent) -> Result<(), EngineError> {
        tracing::debug!(event = event.event_type_name(), "Host event");
        match event {
            HostEvent::WindowCreated { window } => {
                self.on_window_created(&window).await;
                Ok(())
            }
            HostEvent::WindowRemoved { window_id } => self.on_window_removed(window_id).await,
            HostEvent::WindowFocusChanged { window_id } => {
                self.on_window_focus_changed(window_id).await
            }
            HostEvent::TabUpdated { tab_id, window_id } => {
                self.on_tab_changed(Some(tab_id), window_id).await
            }
            HostEvent::TabRemoved {
                tab_id,
                window_id,
                is_window_closing,
            } => {
                // The whole window is going away: window-removed owns this
                // transition, and a partial resnapshot now would corrupt the
                // parked tab list.
                if is_window_closing {
                    return Ok(());
                }
                self.on_tab_changed(Some(tab_id), window_id).await
            }
            HostEvent::TabActivated { tab_id, window_id } => {
                self.on_tab_changed(Some(tab_id), window_id).await
            }
            HostEvent::TabAttached { tab_id, window_id } => {
                self.on_tab_changed(Some(tab_id), window_id).await
            }
            HostEvent::TabDetached {
                tab_id,
                old_window_id,
            } => self.on_tab_detached(tab_id, old_window_id).await,
        }
    }

    /// Re-derive a window's tab list from the host and fold it into the
    /// registry: tracked windows are resnapshotted wholesale; untracked ones
    /// are checked against the closed set and promoted on the first
    /// structural match (in `names` order). Returns the saved name tracking
    /// the window afterwards, and the fetched window, if the host still
    /// knows it.
    async fn resync_window(&mut self, window_id: WindowId) -> Option<(String, LiveWindow)> {
        let window = match self.host.get_window(window_id).await {
            Ok(window) => window,
            Err(e) => {
                // Window vanished between the event and our fetch; the
                // window-removed handler will do the bookkeeping.
                tracing::warn!(window = %window_id, error = %e, "Failed to fetch window for resync");
                return None;
            }
        };

        if let Some(name) = self.registry.name_for_window(window_id).map(str::to_string) {
            if let Some(snapshot) = self.registry.snapshots.get_mut(&name) {
                snapshot.resnapshot(&window);
            }
            return Some((name, window));
        }

        // Not tracked: it may be a saved window that was closed and has just
        // been reopened by hand.
        let matched = self
            .registry
            .names
            .iter()
            .find(|name| {
                self.registry
                    .closed
                    .get(*name)
                    .map(|snapshot| windows_are_equal(&window, snapshot))
                    .unwrap_or(false)
            })
            .cloned();

        let name = matched?;
        if let Some(snapshot) = self.registry.snapshots.get_mut(&name) {
            snapshot.resnapshot(&window);
        }
        self.mark_window_as_open(&window, &name).await;
        Some((name, window))
    }

    /// A tab was created, navigated, closed, moved, or activated: resave the
    /// whole window. Wasteful but robust, with no incremental patching to
    /// get wrong under reordering.
    async fn on_tab_changed(
        &mut self,
        tab_id: Option<TabId>,
        window_id: WindowId,
    ) -> Result<(), EngineError> {
        let resynced = self.resync_window(window_id).await;

        if let Some((name, window)) = &resynced {
            let count = self
                .registry
                .snapshots
                .get(name)
                .map(|s| s.tabs.len().to_string())
                .unwrap_or_default();
            if let Some(tab) = tab_id {
                self.refresh_tab_indicator(tab, &count).await;
            }
            // Keep the rest of the window fresh too, so the indicator on the
            // previously focused tab doesn't go stale.
            self.refresh_window_indicator(window).await;
        }

        self.flush().await
    }

    /// First half of a tab move: re-sync the window the tab left. The tab
    /// itself now belongs elsewhere, so its indicator is cleared until the
    /// attach event re-syncs the receiving window.
    async fn on_tab_detached(
        &mut self,
        tab_id: TabId,
        old_window_id: WindowId,
    ) -> Result<(), EngineError> {
        let resynced = self.resync_window(old_window_id).await;

        self.refresh_tab_indicator(tab_id, "").await;
        if let Some((_, window)) = &resynced {
            self.refresh_window_indicator(window).await;
        }

        self.flush().await
    }

    /// A window closed: park its snapshot in the closed set so a later
    /// window with the same tab prefix can claim the name back.
    async fn on_window_removed(&mut self, window_id: WindowId) -> Result<(), EngineError> {
        let Some(name) = self.registry.live_index.get(&window_id).cloned() else {
            return Ok(());
        };

        if let Some(snapshot) = self.registry.snapshots.get_mut(&name) {
            snapshot.live_id = None;
            let parked = snapshot.clone();
            self.registry.closed.insert(name.clone(), parked);
        }
        self.registry.live_index.remove(&window_id);
        tracing::debug!(name = %name, window = %window_id, "Saved window closed");
        self.flush().await
    }

    /// Focus moved: at most one tracked snapshot may be focused at a time,
    /// and focus landing on an untracked window (or leaving the browser)
    /// clears every flag.
    async fn on_window_focus_changed(
        &mut self,
        window_id: Option<WindowId>,
    ) -> Result<(), EngineError> {
        for snapshot in self.registry.snapshots.values_mut() {
            snapshot.focused = snapshot.live_id.is_some() && snapshot.live_id == window_id;
        }

        if let Some(id) = window_id {
            match self.host.get_window(id).await {
                Ok(window) => self.refresh_window_indicator(&window).await,
                Err(e) => {
                    tracing::debug!(window = %id, error = %e, "Focused window gone before indicator refresh")
                }
            }
        }

        self.flush().await
    }

    /// A window appeared. Only relevant if it is somehow already tracked;
    /// kept as a hook point and to seed the indicator for new windows.
    async fn on_window_created(&mut self, window: &LiveWindow) {
        self.refresh_window_indicator(window).await;
    }

    /// Indicator text for a window: its saved tab count when tracked, empty
    /// otherwise.
    fn indicator_text_for(&self, window_id: WindowId) -> String {
        self.registry
            .name_for_window(window_id)
            .and_then(|name| self.registry.snapshots.get(name))
            .map(|snapshot| snapshot.tabs.len().to_string())
            .unwrap_or_default()
    }

    /// Best-effort per-window indicator refresh; failures are logged, never
    /// propagated.
    pub(crate) async fn refresh_window_indicator(&self, window: &LiveWindow) {
        let text = self.indicator_text_for(window.id);
        if let Err(e) = self.indicators.set_window_text(window, &text).await {
            tracing::warn!(window = %window.id, error = %e, "Failed to refresh window indicator");
        }
    }

    /// Best-effort per-tab indicator refresh; failures are logged, never
    /// propagated.
    pub(crate) async fn refresh_tab_indicator(&self, tab: TabId, text: &str) {
        if let Err(e) = self.indicators.set_tab_text(tab, text).await {
            tracing::warn!(tab = %tab, error = %e, "Failed to refresh tab indicator");
        }
    }
}
