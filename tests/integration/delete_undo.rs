//! Delete and undo operation tests

use super::common::fixtures::{assert_registry_valid, persisted, rig, rig_with_state, saved};
use tabvault::core::EngineError;
use tabvault::host::IndicatorUpdate;

#[tokio::test]
async fn test_delete_removes_name_everywhere_and_clears_indicator() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();
    let window = rig.host.open_window(&["https://a.com", "https://b.com"]);
    rig.engine.save_window(&window, "Work").await.unwrap();
    rig.host.clear_indicator_updates();

    let ok = rig.engine.delete_saved_window("Work").await.unwrap();

    assert!(ok);
    let registry = rig.engine.registry();
    assert!(registry.names.is_empty());
    assert!(registry.snapshots.is_empty());
    assert!(registry.live_index.is_empty());
    assert!(registry.closed.is_empty());
    // The still-open window is no longer tracked, so its indicator clears.
    assert!(rig
        .host
        .indicator_updates()
        .contains(&IndicatorUpdate::Window {
            window: window.id,
            text: String::new(),
        }));
    assert_registry_valid(&rig.engine);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();

    assert!(rig.engine.delete_saved_window("Missing").await.unwrap());
    assert!(
        rig.engine.delete_saved_window("Missing").await.unwrap(),
        "Second delete must still report success"
    );
}

#[tokio::test]
async fn test_undo_restores_name_at_original_position() {
    let state = persisted(&[
        saved("A", &["https://a.com"]),
        saved("B", &["https://b.com"]),
        saved("C", &["https://c.com"]),
    ]);
    let mut rig = rig_with_state(state);
    rig.engine.initialize().await.unwrap();

    rig.engine.delete_saved_window("B").await.unwrap();
    assert_eq!(
        rig.engine.registry().names,
        vec!["A".to_string(), "C".to_string()]
    );

    rig.engine.undo_delete_saved_window("B").await.unwrap();

    assert_eq!(
        rig.engine.registry().names,
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    );
    assert!(rig.engine.registry().closed.contains_key("B"));
    assert_registry_valid(&rig.engine);
}

#[tokio::test]
async fn test_undo_position_is_clamped_when_list_shrank() {
    let state = persisted(&[
        saved("A", &["https://a.com"]),
        saved("B", &["https://b.com"]),
    ]);
    let mut rig = rig_with_state(state);
    rig.engine.initialize().await.unwrap();

    rig.engine.delete_saved_window("B").await.unwrap();
    rig.engine.delete_saved_window("A").await.unwrap();
    rig.engine.undo_delete_saved_window("B").await.unwrap();

    assert_eq!(rig.engine.registry().names, vec!["B".to_string()]);
}

#[tokio::test]
async fn test_undo_reopens_window_that_still_matches() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();
    let window = rig.host.open_window(&["https://a.com", "https://b.com"]);
    rig.engine.save_window(&window, "Work").await.unwrap();

    rig.engine.delete_saved_window("Work").await.unwrap();
    rig.engine.undo_delete_saved_window("Work").await.unwrap();

    let registry = rig.engine.registry();
    assert_eq!(registry.name_for_window(window.id), Some("Work"));
    assert!(!registry.closed.contains_key("Work"));
    assert_registry_valid(&rig.engine);
}

#[tokio::test]
async fn test_undo_falls_back_to_closed_when_window_vanished() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();
    let window = rig.host.open_window(&["https://a.com"]);
    rig.engine.save_window(&window, "Work").await.unwrap();

    rig.engine.delete_saved_window("Work").await.unwrap();
    // The window goes away while the name is deleted; the engine no longer
    // tracks it, so there is no event to handle.
    rig.host.close_window(window.id);

    rig.engine.undo_delete_saved_window("Work").await.unwrap();

    let registry = rig.engine.registry();
    assert!(registry.closed.contains_key("Work"));
    assert!(registry.live_index.is_empty());
    assert_registry_valid(&rig.engine);
}

#[tokio::test]
async fn test_undo_falls_back_to_closed_when_window_no_longer_matches() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();
    let window = rig.host.open_window(&["https://a.com"]);
    rig.engine.save_window(&window, "Work").await.unwrap();

    rig.engine.delete_saved_window("Work").await.unwrap();
    // The user navigated the only tab away while the name was deleted.
    rig.host.navigate_tab(window.tabs[0].id, "https://elsewhere.com");

    rig.engine.undo_delete_saved_window("Work").await.unwrap();

    let registry = rig.engine.registry();
    assert!(registry.closed.contains_key("Work"));
    assert_eq!(registry.name_for_window(window.id), None);
}

#[tokio::test]
async fn test_undo_without_prior_delete_is_not_found() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();

    let err = rig.engine.undo_delete_saved_window("Never").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(name) if name == "Never"));
}

#[tokio::test]
async fn test_undo_consumes_the_buffer_entry() {
    let state = persisted(&[saved("Work", &["https://a.com"])]);
    let mut rig = rig_with_state(state);
    rig.engine.initialize().await.unwrap();

    rig.engine.delete_saved_window("Work").await.unwrap();
    rig.engine.undo_delete_saved_window("Work").await.unwrap();

    let err = rig.engine.undo_delete_saved_window("Work").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_then_undo_round_trips_full_state() {
    let mut rig = rig();
    rig.engine.initialize().await.unwrap();
    let window = rig.host.open_window(&["https://a.com", "https://b.com"]);
    rig.engine.save_window(&window, "Work").await.unwrap();

    let names_before = rig.engine.registry().names.clone();
    let snapshot_before = rig.engine.registry().snapshots["Work"].clone();

    rig.engine.delete_saved_window("Work").await.unwrap();
    rig.engine.undo_delete_saved_window("Work").await.unwrap();

    let registry = rig.engine.registry();
    assert_eq!(registry.names, names_before);
    assert_eq!(registry.snapshots["Work"], snapshot_before);
    assert!(registry.is_open("Work"));
    assert_registry_valid(&rig.engine);
}

#[tokio::test]
async fn test_undo_buffer_is_not_persisted() {
    let state = persisted(&[saved("Work", &["https://a.com"])]);
    let mut rig = rig_with_state(state);
    rig.engine.initialize().await.unwrap();
    rig.engine.delete_saved_window("Work").await.unwrap();

    // A restart loads the flushed blob; the delete capture is gone with the
    // session.
    let restarted_state = rig.store.current();
    let mut restarted = rig_with_state(restarted_state);
    restarted.engine.initialize().await.unwrap();

    let err = restarted
        .engine
        .undo_delete_saved_window("Work")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert!(restarted.engine.registry().names.is_empty());
}
