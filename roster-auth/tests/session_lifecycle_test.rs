//! Session rehydration scenarios against real on-disk credentials

use roster_auth::{CredentialStorage, Permission, SessionStore};

fn store_in(dir: &std::path::Path) -> SessionStore {
    SessionStore::new(CredentialStorage::new(dir).unwrap())
}

#[test]
fn startup_with_empty_storage_is_anonymous() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());

    store.initialize();

    assert!(!store.is_authenticated());
    assert!(store.current_user().is_none());
    assert!(store.token().is_none());
}

#[test]
fn startup_with_stored_credentials_rehydrates() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("token"), "abc").unwrap();
    std::fs::write(
        dir.path().join("user.json"),
        r#"{"id":1,"name":"An","permissions":["EDIT_TAG"]}"#,
    )
    .unwrap();

    let store = store_in(dir.path());
    store.initialize();

    assert!(store.is_authenticated());
    assert_eq!(store.token().as_deref(), Some("abc"));
    let user = store.current_user().unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(user.name, "An");
    assert!(store.has_permission(Permission::EditTag));
    assert!(!store.has_permission(Permission::DeleteTag));
}

#[test]
fn rehydration_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("token"), "abc").unwrap();
    std::fs::write(
        dir.path().join("user.json"),
        r#"{"id":1,"name":"An","permissions":["ADMIN"]}"#,
    )
    .unwrap();

    let store = store_in(dir.path());
    store.initialize();
    let first = store.current_user().unwrap();
    store.initialize();
    let second = store.current_user().unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.name, second.name);
    assert!(store.is_authenticated());
}

#[test]
fn corrupted_user_record_fails_closed_and_wipes_storage() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("token"), "abc").unwrap();
    std::fs::write(dir.path().join("user.json"), r#"{"id":"oops"#).unwrap();

    let store = store_in(dir.path());
    store.initialize();

    assert!(!store.is_authenticated());
    assert!(!dir.path().join("token").exists());
    assert!(!dir.path().join("user.json").exists());
}

#[test]
fn admin_wildcard_applies_after_rehydration() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("token"), "abc").unwrap();
    std::fs::write(
        dir.path().join("user.json"),
        r#"{"id":3,"name":"Sam","roles":["BOARD"],"permissions":["ADMIN"]}"#,
    )
    .unwrap();

    let store = store_in(dir.path());
    store.initialize();

    assert!(store.has_permission(Permission::DeleteTag));
    assert!(store.has_permission(Permission::EditParticipant));
    // wildcard covers permissions only, not roles
    assert!(store.has_role("BOARD"));
    assert!(!store.has_role("TRAINER"));
}

#[test]
fn unknown_permission_in_stored_record_is_corrupt_state() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("token"), "abc").unwrap();
    std::fs::write(
        dir.path().join("user.json"),
        r#"{"id":4,"name":"Kim","permissions":["EDIT_TGA"]}"#,
    )
    .unwrap();

    let store = store_in(dir.path());
    store.initialize();

    // the closed permission vocabulary rejects the record wholesale
    assert!(!store.is_authenticated());
    assert!(!dir.path().join("user.json").exists());
}
