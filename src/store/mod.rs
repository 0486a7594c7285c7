//! Durable key/value storage
//!
//! Synchronous, last write wins, no transactions. [`FileStore`] keeps the
//! whole map in memory and rewrites a JSON file on every mutation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Store key of the adaptive session log
pub const SESSION_LOG_KEY: &str = "sessionLog";

/// Errors from persisting the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value store contract consumed by the engine
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store, used in tests and when no data directory is available
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON-file-backed store
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`
    ///
    /// A missing file starts empty. An unreadable or corrupt file is logged
    /// and also starts empty, so callers fall back to defaults.
    pub fn open(path: &Path) -> Self {
        let entries = match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(?path, ?e, "store file corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(?path, ?e, "store file unreadable, starting empty");
                BTreeMap::new()
            }
        };

        debug!(?path, keys = entries.len(), "store opened");

        Self {
            path: path.to_owned(),
            entries,
        }
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Append-only adaptive session log kept under one store key
pub struct SessionLog;

impl SessionLog {
    /// Append text to the log
    pub fn append(store: &mut dyn KeyValueStore, text: &str) -> Result<(), StoreError> {
        let mut log = store.get(SESSION_LOG_KEY).unwrap_or_default();
        log.push_str(text);
        store.set(SESSION_LOG_KEY, &log)
    }

    /// Entire log contents
    pub fn contents(store: &dyn KeyValueStore) -> String {
        store.get(SESSION_LOG_KEY).unwrap_or_default()
    }

    /// Drop the whole log
    pub fn clear(store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        store.remove(SESSION_LOG_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_last_write_wins() {
        let mut store = MemoryStore::new();
        store.set("k", "a").unwrap();
        store.set("k", "b").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("b"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_file_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("store.json");
        {
            let mut store = FileStore::open(&path);
            store.set("voice", "en-gb").unwrap();
            store.set("gone", "x").unwrap();
            store.remove("gone").unwrap();
        }

        let store = FileStore::open(&path);
        assert_eq!(store.get("voice").as_deref(), Some("en-gb"));
        assert_eq!(store.get("gone"), None);
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("settings"), None);
    }

    #[test]
    fn test_session_log_appends_and_clears() {
        let mut store = MemoryStore::new();
        SessionLog::append(&mut store, "HELLO ").unwrap();
        SessionLog::append(&mut store, "WORLD ").unwrap();
        assert_eq!(SessionLog::contents(&store), "HELLO WORLD ");

        SessionLog::clear(&mut store).unwrap();
        assert_eq!(SessionLog::contents(&store), "");
    }
}
