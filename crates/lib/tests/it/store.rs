//! User record store tests
//!
//! Exercises the in-memory implementation through the UserStore trait:
//! unique index enforcement, transactional commit/rollback, and snapshot
//! persistence with index rebuild.

use std::collections::HashMap;

use cormorant::{InMemory, UserStore};

use super::helpers::*;

// ===== UNIQUE INDEX TESTS =====

#[test]
fn test_insert_enforces_all_unique_indexes() {
    let store = InMemory::new();
    store
        .insert(&make_record("id-1", "alice", "key-1"))
        .expect("First insert should succeed");

    // Same identifier
    let err = store
        .insert(&make_record("id-1", "bob", "key-2"))
        .unwrap_err();
    assert!(err.is_conflict());

    // Same username
    let err = store
        .insert(&make_record("id-2", "alice", "key-2"))
        .unwrap_err();
    assert!(err.is_conflict());

    // Same API key
    let err = store
        .insert(&make_record("id-2", "bob", "key-1"))
        .unwrap_err();
    assert!(err.is_conflict());

    // Exactly the original record remains
    assert_eq!(store.list().expect("Failed to list").len(), 1);
}

#[test]
fn test_update_rejects_stealing_indexed_values() {
    let store = InMemory::new();
    store.insert(&make_record("id-1", "alice", "key-1")).unwrap();
    store.insert(&make_record("id-2", "bob", "key-2")).unwrap();

    let mut bob = store.find_by_username("bob").unwrap().unwrap();
    bob.username = "alice".to_string();
    let err = store.update(&bob).unwrap_err();
    assert!(err.is_conflict());

    // Bob is unchanged
    assert_eq!(
        store
            .find_by_username("bob")
            .unwrap()
            .expect("bob should still exist")
            .identifier,
        "id-2"
    );
}

// ===== TRANSACTION TESTS =====

#[test]
fn test_failed_transaction_is_rolled_back() {
    let store = InMemory::new();
    store.insert(&make_record("id-1", "alice", "key-1")).unwrap();

    let result: cormorant::Result<()> = store.with_transaction(|txn| {
        txn.delete_where(|user| user.username == "alice")?;
        txn.insert(&make_record("id-2", "bob", "key-2"))?;
        // Duplicate insert aborts the transaction after both staged writes
        txn.insert(&make_record("id-2", "bob", "key-2"))?;
        Ok(())
    });
    assert!(result.is_err());

    // Neither staged write is visible
    assert!(store.find_by_username("alice").unwrap().is_some());
    assert!(store.find_by_username("bob").unwrap().is_none());
}

#[test]
fn test_store_usable_after_failed_transaction() {
    let store = InMemory::new();
    let _ = store.with_transaction(|txn| {
        txn.insert(&make_record("id-1", "alice", "key-1"))?;
        txn.insert(&make_record("id-1", "alice", "key-1"))
    });

    // The write lock was released on the failure path
    store
        .insert(&make_record("id-1", "alice", "key-1"))
        .expect("Store should accept writes after a failed transaction");
}

// ===== PERSISTENCE TESTS =====

#[test]
fn test_snapshot_round_trip_rebuilds_indexes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");

    let store = InMemory::new();
    store.insert(&make_record("id-1", "alice", "key-1")).unwrap();
    store.insert(&make_record("id-2", "bob", "key-2")).unwrap();
    store.save_to_file(&path).expect("Failed to save snapshot");

    let loaded = InMemory::load_from_file(&path).expect("Failed to load snapshot");
    assert_eq!(loaded.list().unwrap().len(), 2);

    // Both secondary indexes answer lookups after the reload
    assert_eq!(
        loaded.find_by_username("alice").unwrap().unwrap().identifier,
        "id-1"
    );
    assert_eq!(
        loaded.find_by_api_key("key-2").unwrap().unwrap().username,
        "bob"
    );

    // And the unique constraints are live again
    assert!(
        loaded
            .insert(&make_record("id-3", "alice", "key-3"))
            .unwrap_err()
            .is_conflict()
    );
}

#[test]
fn test_load_missing_file_returns_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = InMemory::load_from_file(dir.path().join("absent.json")).unwrap();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_corrupt_snapshot_duplicate_username_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");

    // Two records sharing a username, keyed by distinct identifiers; this
    // can never be produced through the store API.
    let mut rows = HashMap::new();
    for identifier in ["id-1", "id-2"] {
        let record = make_record(identifier, "alice", &format!("key-{identifier}"));
        rows.insert(
            identifier.to_string(),
            serde_json::to_string(&record).unwrap(),
        );
    }
    let snapshot = serde_json::json!({ "rows": rows });
    std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

    let err = InMemory::load_from_file(&path).unwrap_err();
    assert!(err.is_integrity_error());
}

#[test]
fn test_snapshot_row_keyed_by_wrong_identifier_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");

    let record = make_record("id-1", "alice", "key-1");
    let mut rows = HashMap::new();
    rows.insert(
        "id-other".to_string(),
        serde_json::to_string(&record).unwrap(),
    );
    let snapshot = serde_json::json!({ "rows": rows });
    std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

    let err = InMemory::load_from_file(&path).unwrap_err();
    assert!(err.is_integrity_error());
}

#[test]
fn test_unsupported_snapshot_version_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, r#"{"_v": 7, "rows": {}}"#).unwrap();

    let err = InMemory::load_from_file(&path).unwrap_err();
    assert_eq!(err.module(), "store");
}
