//! Key-value storage capability
//!
//! The task list manager never touches the filesystem directly. It is handed
//! a [`Store`] and reads/writes whole blobs by key.
//!
//! # Directory Structure
//!
//! ```text
//! <data_dir>/
//!   tasks.json         # JSON array of tasks (one blob per key)
//!   tasks.json.lock    # Lock file guarding reads and writes of the blob
//!   checklist.log      # tracing output while the TUI runs (RUST_LOG)
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

/// Whole-blob key-value storage
pub trait Store: Send + Sync {
    /// Read the blob stored under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrite the blob stored under `key`
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Check that a key is usable as a file name
///
/// Keys are non-empty, made of ASCII alphanumerics, `-`, `_` and `.`, and do
/// not start with `.`.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidArgument("storage key cannot be empty".to_string()));
    }
    if key.starts_with('.') {
        return Err(Error::InvalidArgument(format!(
            "storage key '{key}' cannot start with '.'"
        )));
    }
    if let Some(ch) = key
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.')))
    {
        return Err(Error::InvalidArgument(format!(
            "storage key '{key}' contains invalid character '{ch}'"
        )));
    }
    Ok(())
}

/// Store that keeps each key in `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path of the blob for `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        lock::read_locked(&path, self.lock_timeout_ms)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        lock::write_atomic_locked(&path, value, self.lock_timeout_ms)?;
        tracing::trace!(path = %path.display(), bytes = value.len(), "blob written");
        Ok(())
    }
}

/// In-process store, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` with `value`
    pub fn with_entry(self, key: &str, value: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.into());
        }
        self
    }

    /// Current blob under `key` as a UTF-8 string
    pub fn get_string(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .map(|value| String::from_utf8_lossy(value).to_string())
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().map_err(|_| poisoned(key))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned(key))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

fn poisoned(key: &str) -> Error {
    Error::Storage {
        key: key.to_string(),
        message: "memory store lock poisoned".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_key_accepts_plain_names() {
        for key in ["tasks", "tasks-v2", "my_list", "list.backup"] {
            validate_key(key).expect(key);
        }
    }

    #[test]
    fn validate_key_rejects_paths_and_hidden_names() {
        for key in ["", ".tasks", "../tasks", "a/b", "a\\b", "tasks list"] {
            let err = validate_key(key).expect_err(key);
            assert!(matches!(err, Error::InvalidArgument(_)), "{key}: {err}");
        }
    }

    #[test]
    fn file_store_round_trips_and_reports_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("data"));

        assert!(store.get("tasks").expect("get").is_none());

        store.set("tasks", b"[]").expect("set");
        assert_eq!(store.get("tasks").expect("get"), Some(b"[]".to_vec()));
        assert!(dir.path().join("data").join("tasks.json").exists());
    }

    #[test]
    fn file_store_rejects_invalid_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        assert!(store.set("../outside", b"[]").is_err());
        assert!(store.get("../outside").is_err());
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new().with_entry("tasks", "[]");
        let clone = store.clone();
        clone.set("tasks", b"[1]").expect("set");
        assert_eq!(store.get_string("tasks").as_deref(), Some("[1]"));
        assert!(store.get("other").expect("get").is_none());
    }
}
