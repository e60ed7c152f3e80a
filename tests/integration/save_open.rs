//! Save and open operation tests

use super::common::fixtures::{assert_registry_valid, persisted, rig, rig_with_state, saved};
use tabvault::core::Request;
use tabvault::core::Response;
use tabvault::data::SavedTab;
use tabvault::host::{IndicatorUpdate, MockHost};

#[tokio::test]
async fn test_save_captures_tabs_verbatim() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();
    let window = rig.host.open_window(&["https://a.com", "https://b.com"]);

    let stored = rig
        .engine
        .save_window(&window, "Work")
        .await
        .unwrap()
        .expect("save should produce a snapshot");

    let registry = rig.engine.registry();
    assert_eq!(registry.names, vec!["Work".to_string()]);
    assert_eq!(stored.tabs.len(), window.tabs.len());
    assert_eq!(registry.snapshots["Work"].tabs[0].url, "https://a.com");
    assert_eq!(registry.snapshots["Work"].tabs[1].url, "https://b.com");
    assert_eq!(registry.name_for_window(window.id), Some("Work"));
    assert_registry_valid(&rig.engine);
}

#[tokio::test]
async fn test_save_empty_name_is_silent_noop() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();
    let window = rig.host.open_window(&["https://a.com"]);
    let flushes_before = rig.store.save_count();

    let stored = rig.engine.save_window(&window, "").await.unwrap();

    assert!(stored.is_none());
    assert!(rig.engine.registry().names.is_empty());
    assert_eq!(
        rig.store.save_count(),
        flushes_before,
        "A rejected save must not flush"
    );
}

#[tokio::test]
async fn test_save_duplicate_name_is_silent_noop() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();
    let first = rig.host.open_window(&["https://a.com"]);
    let second = rig.host.open_window(&["https://b.com"]);

    rig.engine.save_window(&first, "Work").await.unwrap();
    let stored = rig.engine.save_window(&second, "Work").await.unwrap();

    assert!(stored.is_none());
    let registry = rig.engine.registry();
    assert_eq!(registry.names.len(), 1);
    assert_eq!(registry.snapshots["Work"].tabs[0].url, "https://a.com");
    assert_eq!(
        registry.name_for_window(second.id),
        None,
        "The rejected window must stay untracked"
    );
}

#[tokio::test]
async fn test_save_signals_indicator_with_tab_count() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();
    let window = rig.host.open_window(&["https://a.com", "https://b.com"]);
    rig.host.clear_indicator_updates();

    rig.engine.save_window(&window, "Work").await.unwrap();

    assert!(rig
        .host
        .indicator_updates()
        .contains(&IndicatorUpdate::Window {
            window: window.id,
            text: "2".to_string(),
        }));
}

#[tokio::test]
async fn test_open_creates_window_in_order_and_moves_name_to_mru_end() {
    let state = persisted(&[
        saved("Work", &["https://a.com", "https://b.com"]),
        saved("Play", &["https://c.com"]),
    ]);
    let mut rig = rig_with_state(state);
    rig.engine.initialize().await.unwrap();

    let (stored, window) = rig.engine.open_window("Work").await.unwrap();

    let urls: Vec<&str> = window.tabs.iter().map(|t| t.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.com", "https://b.com"]);
    assert_eq!(stored.live_id, Some(window.id));
    assert_eq!(
        rig.engine.registry().names,
        vec!["Play".to_string(), "Work".to_string()],
        "Opened name moves to the most-recently-used end"
    );
    assert_eq!(rig.engine.registry().name_for_window(window.id), Some("Work"));
    assert!(!rig.engine.registry().closed.contains_key("Work"));
    assert_registry_valid(&rig.engine);
}

#[tokio::test]
async fn test_open_unknown_name_is_not_found() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();

    let err = rig.engine.open_window("Nope").await.unwrap_err();
    assert!(matches!(err, tabvault::core::EngineError::NotFound(name) if name == "Nope"));
}

#[tokio::test]
async fn test_open_restores_pinned_flags() {
    let mut state = persisted(&[saved("Work", &["https://a.com", "https://b.com"])]);
    state.saved_windows.get_mut("Work").unwrap().tabs[0].pinned = true;

    let mut rig = rig_with_state(state);
    rig.engine.initialize().await.unwrap();

    let (_, window) = rig.engine.open_window("Work").await.unwrap();

    let live = rig.host.window(window.id).unwrap();
    assert!(live.tabs[0].pinned);
    assert!(!live.tabs[1].pinned);
}

#[tokio::test]
async fn test_open_substitutes_blank_for_missing_urls() {
    let mut state = persisted(&[saved("Work", &["https://a.com"])]);
    state
        .saved_windows
        .get_mut("Work")
        .unwrap()
        .tabs
        .push(SavedTab {
            url: String::new(),
            pinned: false,
            title: String::new(),
        });

    let mut rig = rig_with_state(state);
    rig.engine.initialize().await.unwrap();

    let (_, window) = rig.engine.open_window("Work").await.unwrap();
    assert_eq!(window.tabs[1].url, "about:blank");
}

#[tokio::test]
async fn test_open_closes_placeholder_tab_in_focused_window() {
    let state = persisted(&[saved("Work", &["https://a.com"])]);
    let mut rig = rig_with_state(state);
    // The focused window is sitting on a fresh blank tab.
    let blank = rig.host.open_window(&["about:blank"]);
    rig.engine.initialize().await.unwrap();

    rig.engine.open_window("Work").await.unwrap();

    assert!(
        rig.host.window(blank.id).unwrap().tabs.is_empty(),
        "The placeholder tab should have been closed"
    );
}

#[tokio::test]
async fn test_open_propagates_window_creation_failure() {
    let state = persisted(&[saved("Work", &["https://a.com"])]);
    let host = MockHost::new().failing_create();
    let rig = rig_with_state(state);
    // Swap in a failing host by rebuilding the engine over the same store.
    let store = rig.store.clone();
    let mut engine = tabvault::core::Engine::new(
        store.clone(),
        std::sync::Arc::new(host.clone()),
        std::sync::Arc::new(host.clone()),
    );
    engine.initialize().await.unwrap();
    let flushes = store.save_count();

    let err = engine.open_window("Work").await.unwrap_err();

    assert!(matches!(err, tabvault::core::EngineError::Host(_)));
    assert!(
        engine.registry().closed.contains_key("Work"),
        "A failed open must leave the snapshot closed"
    );
    assert_eq!(store.save_count(), flushes, "A failed open must not flush");
}

#[tokio::test]
async fn test_save_request_falls_back_to_current_window() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();
    let window = rig.host.open_window(&["https://a.com"]);

    let response = rig
        .engine
        .handle_request(Request::SaveWindow {
            window: None,
            name: "Work".to_string(),
        })
        .await;

    match response {
        Response::Saved { saved: Some(s) } => assert_eq!(s.tabs[0].url, "https://a.com"),
        other => panic!("Unexpected response: {:?}", other),
    }
    assert_eq!(rig.engine.registry().name_for_window(window.id), Some("Work"));
}

#[tokio::test]
async fn test_get_state_includes_default_name() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();

    let response = rig.engine.handle_request(Request::GetState).await;
    match response {
        Response::State { default_name, .. } => assert_eq!(default_name, "Window"),
        other => panic!("Unexpected response: {:?}", other),
    }
}
