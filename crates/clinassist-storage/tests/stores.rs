use clinassist_storage::state::{load_json, load_json_lenient, remove_all, save_json};
use clinassist_storage::{FileStore, KeyValueStore, MemoryStore, StorageError, keys};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Profile {
    id: i64,
    name: String,
}

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    assert!(store.is_empty());
    store.set(keys::ACCESS_TOKEN, "abc").unwrap();
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("abc"));
    assert!(store.contains(keys::ACCESS_TOKEN).unwrap());
    store.remove(keys::ACCESS_TOKEN).unwrap();
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap(), None);
    store.remove("never-set").unwrap();
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    {
        let store = FileStore::open(&path).unwrap();
        store.set(keys::ACCESS_TOKEN, "token-1").unwrap();
        store.set(keys::THERAPEUTE_ID, "7").unwrap();
    }

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("token-1"));
    assert_eq!(reopened.get(keys::THERAPEUTE_ID).unwrap().as_deref(), Some("7"));
    assert!(!path.with_extension("json.tmp").exists());
}

#[cfg(unix)]
#[test]
fn file_store_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileStore::open(&path).unwrap();
    store.set(keys::REFRESH_TOKEN, "r").unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn file_store_rejects_garbage_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "not json").unwrap();
    let err = FileStore::open(&path).unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[test]
fn json_round_trip_through_store() {
    let store = MemoryStore::new();
    let profile = Profile {
        id: 4,
        name: "Dr. Fatima Benali".to_string(),
    };
    save_json(&store, keys::USER, &profile).unwrap();
    let loaded: Option<Profile> = load_json(&store, keys::USER).unwrap();
    assert_eq!(loaded, Some(profile));

    let missing: Option<Profile> = load_json(&store, keys::CURRENT_THERAPEUTE).unwrap();
    assert!(missing.is_none());
}

#[test]
fn corrupt_value_is_reported_and_lenient_load_discards_it() {
    let store = MemoryStore::new();
    store.set(keys::USER, "{broken").unwrap();

    let err = load_json::<Profile>(&store, keys::USER).unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }));

    let lenient: Option<Profile> = load_json_lenient(&store, keys::USER);
    assert!(lenient.is_none());
    assert!(!store.contains(keys::USER).unwrap());
}

#[test]
fn remove_all_clears_session_keys() {
    let store = MemoryStore::new();
    for key in keys::SESSION_KEYS {
        store.set(key, "x").unwrap();
    }
    store.set("unrelated", "keep").unwrap();

    remove_all(&store, &keys::SESSION_KEYS).unwrap();

    for key in keys::SESSION_KEYS {
        assert!(!store.contains(key).unwrap());
    }
    assert_eq!(store.len(), 1);
}
