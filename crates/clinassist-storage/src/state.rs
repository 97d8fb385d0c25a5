use serde::{Serialize, de::DeserializeOwned};

use crate::error::StorageError;
use crate::objects::KeyValueStore;

/// Load a JSON value stored under `key`. Returns `None` when the key is
/// absent.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(raw) => {
            let value = serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Serialize `value` as JSON under `key`.
pub fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Load a JSON value, dropping it (and logging) if it no longer parses.
///
/// Used at startup hydration, where a corrupt entry should degrade to a
/// signed-out state rather than fail the whole client.
pub fn load_json_lenient<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match load_json(store, key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable stored value");
            if let Err(e) = store.remove(key) {
                tracing::warn!(key, error = %e, "failed to remove unreadable stored value");
            }
            None
        }
    }
}

/// Remove every key in `keys`, stopping at the first failure.
pub fn remove_all(store: &dyn KeyValueStore, keys: &[&str]) -> Result<(), StorageError> {
    for key in keys {
        store.remove(key)?;
    }
    Ok(())
}
