//! Key-value persistence.
//!
//! Every domain keeps its state as one JSON document under one key. The
//! backing store is a [`KeyValueStore`]: SQLite on disk ([`Database`]) or an
//! in-memory map ([`MemoryStore`]). Services never touch the store directly;
//! they hold [`Persistent`] containers.

mod config;
pub mod database;
pub mod keys;
pub mod memory;
pub mod persistent;

pub use config::{ClassModeConfig, Config, GoalsConfig, PlanningConfig, PomodoroConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use persistent::{Persistent, SharedStore};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::StorageError;

/// Raw string storage addressed by key.
pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn has(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get_raw(key)?.is_some())
    }

    /// Remove every key starting with `prefix`. Returns how many were removed.
    fn clear_prefixed(&self, prefix: &str) -> Result<usize, StorageError>;
}

/// Read and decode `key`. Missing keys, storage failures and undecodable
/// values all come back as `None`; the latter two are logged.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get_raw(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage read failed");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            let e = StorageError::Codec {
                key: key.to_string(),
                message: e.to_string(),
            };
            tracing::warn!(key, error = %e, "stored value could not be decoded");
            None
        }
    }
}

/// Encode and write `value` under `key`. Returns whether the write landed;
/// failures are logged, never raised.
pub fn save<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(key, error = %e, "value could not be encoded");
            return false;
        }
    };
    match store.set_raw(key, &json) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage write failed");
            false
        }
    }
}

/// Returns the data directory.
///
/// `STUDYROOM_DATA_DIR` wins when set. Otherwise `~/.config/studyroom[-dev]/`
/// based on `STUDYROOM_ENV`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("STUDYROOM_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studyroom-dev")
            } else {
                base_dir.join("studyroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        let value = Sample {
            name: "Physique".into(),
            count: 2,
        };
        assert!(save(&store, "app_sample", &value));
        assert_eq!(load::<Sample>(&store, "app_sample"), Some(value));
    }

    #[test]
    fn load_of_garbage_is_none() {
        let store = MemoryStore::new();
        store.set_raw("app_sample", "{not json").unwrap();
        assert_eq!(load::<Sample>(&store, "app_sample"), None);
    }

    #[test]
    fn save_to_unavailable_store_reports_false() {
        let store = MemoryStore::unavailable();
        assert!(!save(&store, "app_sample", &1u32));
        assert_eq!(load::<u32>(&store, "app_sample"), None);
    }

    #[test]
    fn date_looking_strings_stay_strings() {
        let store = MemoryStore::new();
        let note = "2024-01-01T10:00:00 was the exam".to_string();
        assert!(save(&store, "app_note", &note));
        assert_eq!(load::<String>(&store, "app_note"), Some(note));
    }
}
