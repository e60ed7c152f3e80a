//! Startup reconciliation tests
//!
//! A fresh process loads the registry, discards every live identifier from
//! the previous session, and re-derives which saved windows are open by
//! structural matching against the host's current windows.

use super::common::fixtures::{assert_registry_valid, persisted, rig_with_state, saved};
use tabvault::data::SavedWindow;
use tabvault::host::WindowId;

#[tokio::test]
async fn test_initialize_clears_stale_live_ids() {
    // The previous session flushed a live id that no longer means anything.
    let mut state = persisted(&[saved("Work", &["https://a.com"])]);
    state
        .saved_windows
        .get_mut("Work")
        .unwrap()
        .live_id = Some(WindowId(42));
    state
        .window_id_to_name
        .insert(WindowId(42), "Work".to_string());

    let mut rig = rig_with_state(state);
    rig.engine.initialize().await.unwrap();

    let registry = rig.engine.registry();
    assert!(registry.live_index.is_empty());
    assert_eq!(registry.snapshots["Work"].live_id, None);
    assert!(registry.closed.contains_key("Work"));
    assert_registry_valid(&rig.engine);
}

#[tokio::test]
async fn test_initialize_sweeps_orphan_names() {
    let mut state = persisted(&[saved("Work", &["https://a.com"])]);
    state.saved_window_names.push("Ghost".to_string());

    let mut rig = rig_with_state(state);
    rig.engine.initialize().await.unwrap();

    assert_eq!(rig.engine.registry().names, vec!["Work".to_string()]);
    assert_registry_valid(&rig.engine);
}

#[tokio::test]
async fn test_initialize_matches_open_window_by_prefix() {
    let state = persisted(&[saved("Work", &["https://a.com", "https://b.com"])]);
    let rig = rig_with_state(state);
    // The user reopened the window by hand and added a tab since.
    let window = rig
        .host
        .open_window(&["https://a.com", "https://b.com", "https://c.com"]);

    let mut engine = rig.engine;
    engine.initialize().await.unwrap();

    let registry = engine.registry();
    assert_eq!(registry.name_for_window(window.id), Some("Work"));
    assert!(!registry.closed.contains_key("Work"));
    assert_eq!(registry.snapshots["Work"].live_id, Some(window.id));
    // Matching resnapshots from the live window, picking up the extra tab.
    assert_eq!(registry.snapshots["Work"].tabs.len(), 3);
    assert_registry_valid(&engine);
}

#[tokio::test]
async fn test_initialize_first_match_wins_by_name_order() {
    // Both snapshots are valid prefixes of both windows; names order is the
    // documented priority, and a claimed window is not reconsidered.
    let state = persisted(&[
        saved("First", &["https://x.com"]),
        saved("Second", &["https://x.com"]),
    ]);
    let rig = rig_with_state(state);
    let w1 = rig.host.open_window(&["https://x.com"]);
    let w2 = rig.host.open_window(&["https://x.com"]);

    let mut engine = rig.engine;
    engine.initialize().await.unwrap();

    let registry = engine.registry();
    assert_eq!(registry.name_for_window(w1.id), Some("First"));
    assert_eq!(registry.name_for_window(w2.id), Some("Second"));
    assert_registry_valid(&engine);
}

#[tokio::test]
async fn test_initialize_leaves_unmatched_names_closed() {
    let state = persisted(&[
        saved("Open", &["https://a.com"]),
        saved("Gone", &["https://z.com"]),
    ]);
    let rig = rig_with_state(state);
    rig.host.open_window(&["https://a.com"]);

    let mut engine = rig.engine;
    engine.initialize().await.unwrap();

    // Every saved name is tracked-open xor closed, never both or neither.
    let registry = engine.registry();
    for name in &registry.names {
        let open = registry.is_open(name);
        let closed = registry.closed.contains_key(name);
        assert!(
            open ^ closed,
            "{name} should be exactly one of open/closed (open={open}, closed={closed})"
        );
    }
    assert!(registry.is_open("Open"));
    assert!(registry.closed.contains_key("Gone"));
    assert_registry_valid(&engine);
}

#[tokio::test]
async fn test_initialize_never_claims_incognito_windows() {
    let state = persisted(&[saved("Work", &["https://a.com"])]);
    let rig = rig_with_state(state);
    rig.host.open_incognito_window(&["https://a.com"]);

    let mut engine = rig.engine;
    engine.initialize().await.unwrap();

    assert!(engine.registry().live_index.is_empty());
    assert!(engine.registry().closed.contains_key("Work"));
}

#[tokio::test]
async fn test_initialize_never_claims_with_empty_snapshot() {
    // An empty snapshot would otherwise match every fresh blank window.
    let state = persisted(&[SavedWindow {
        name: "Empty".to_string(),
        tabs: Vec::new(),
        live_id: None,
        focused: false,
    }]);
    let rig = rig_with_state(state);
    rig.host.open_window(&["about:blank"]);

    let mut engine = rig.engine;
    engine.initialize().await.unwrap();

    assert!(engine.registry().live_index.is_empty());
}

#[tokio::test]
async fn test_initialize_flushes_reconciled_state() {
    let state = persisted(&[saved("Work", &["https://a.com"])]);
    let rig = rig_with_state(state);
    let mut engine = rig.engine;
    engine.initialize().await.unwrap();

    assert_eq!(rig.store.save_count(), 1);
    // The flushed blob carries the reconciled closed set.
    assert!(rig.store.current().closed_windows.contains_key("Work"));
}
