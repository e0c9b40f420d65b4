//! End-to-end tests for the persisted stores and the registration flow
//! invariants that don't need a live Telegram connection.

use serde_json::json;
use tempfile::tempdir;
use tikgrab::storage::{AllowlistStore, PreferencesStore};

#[tokio::test]
async fn test_allowlist_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("allowed_users.json");

    {
        let store = AllowlistStore::load(&path);
        assert!(store.add(42).await.unwrap());
        assert!(store.add(7).await.unwrap());
        assert!(store.remove(7).await.unwrap());
    }

    // Simulates a process restart: a fresh store reads the same file.
    let store = AllowlistStore::load(&path);
    assert!(store.contains(42).await);
    assert!(!store.contains(7).await);
    assert_eq!(store.list().await, vec![42]);
}

#[tokio::test]
async fn test_first_contact_registration_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = AllowlistStore::load(dir.path().join("allowed_users.json"));

    // First /start registers; the second must not duplicate.
    assert!(store.add(42).await.unwrap());
    assert!(!store.add(42).await.unwrap());
    assert_eq!(store.list().await, vec![42]);
}

#[tokio::test]
async fn test_removing_unknown_user_reports_not_found() {
    let dir = tempdir().unwrap();
    let store = AllowlistStore::load(dir.path().join("allowed_users.json"));
    store.add(1).await.unwrap();

    assert!(!store.remove(2).await.unwrap());
    assert_eq!(store.list().await, vec![1]);
}

#[tokio::test]
async fn test_preferences_round_trip_across_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user_preferences.json");

    {
        let store = PreferencesStore::load(&path);
        store.set(42, json!({"language_code": "fr"})).await.unwrap();
    }

    let store = PreferencesStore::load(&path);
    assert_eq!(store.get(42).await, Some(json!({"language_code": "fr"})));
}

#[tokio::test]
async fn test_corrupted_documents_recover_to_defaults() {
    let dir = tempdir().unwrap();
    let users_path = dir.path().join("allowed_users.json");
    let prefs_path = dir.path().join("user_preferences.json");
    std::fs::write(&users_path, "]]]").unwrap();
    std::fs::write(&prefs_path, "{\"42\": ").unwrap();

    let allowlist = AllowlistStore::load(&users_path);
    let preferences = PreferencesStore::load(&prefs_path);

    assert!(allowlist.list().await.is_empty());
    assert_eq!(preferences.get(42).await, None);

    // The stores stay usable after recovery.
    assert!(allowlist.add(5).await.unwrap());
    assert!(allowlist.contains(5).await);
}
