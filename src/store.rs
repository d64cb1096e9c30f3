//! Persistent preference store
//!
//! String-keyed, string-valued storage for settings and widget documents.
//! Values are read once at startup and written through on every change.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const KEY_ACTIVE_TAB: &str = "activeTab";
pub const KEY_DARK_MODE: &str = "darkMode";
pub const KEY_TIMER_MINUTES: &str = "pomodoroMinutes";
pub const KEY_TIMER_SECONDS: &str = "pomodoroSeconds";
pub const KEY_TIMER_RUNNING: &str = "pomodoroIsActive";
pub const KEY_CALENDAR_EVENTS: &str = "calendarEvents";
pub const KEY_TODOS: &str = "todos";
pub const KEY_NOTES: &str = "postitNotes";

/// Key-value storage backend
pub trait PreferenceStore {
    fn read_string(&self, key: &str) -> Option<String>;
    fn write_string(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Read a boolean stored as `true` / `false`
pub fn read_bool(store: &dyn PreferenceStore, key: &str) -> Option<bool> {
    let raw = store.read_string(key)?;
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            debug!("Ignoring malformed boolean {:?} for key {}", other, key);
            None
        }
    }
}

/// Read an unsigned integer stored in decimal
pub fn read_u32(store: &dyn PreferenceStore, key: &str) -> Option<u32> {
    let raw = store.read_string(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!("Ignoring malformed integer {:?} for key {}", raw, key);
            None
        }
    }
}

/// Read a JSON document, `None` when missing or unparseable
pub fn read_json<T: DeserializeOwned>(store: &dyn PreferenceStore, key: &str) -> Option<T> {
    let raw = store.read_string(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt document under key {}: {}", key, e);
            None
        }
    }
}

/// Serialize a value as JSON and store it
pub fn write_json<T: Serialize>(store: &mut dyn PreferenceStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize value for key {}", key))?;
    store.write_string(key, &json)
}

/// In-memory store, used when no storage file can be opened
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn read_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object on disk
///
/// The whole map is rewritten on every write through a temporary file that
/// is renamed over the target, so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; a corrupt
    /// one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read storage from {:?}", path))?;
            match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Storage file {:?} is corrupt ({}), starting empty", path, e);
                    BTreeMap::new()
                }
            }
        } else {
            debug!("No storage file at {:?}, starting empty", path);
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create storage directory {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(&self.values).context("Failed to serialize storage")?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).with_context(|| format!("Failed to write storage to {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace storage file {:?}", self.path))?;

        Ok(())
    }

    fn restore(&mut self, key: &str, previous: Option<String>) {
        match previous {
            Some(value) => self.values.insert(key.to_string(), value),
            None => self.values.remove(key),
        };
    }
}

impl PreferenceStore for FileStore {
    fn read_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write_string(&mut self, key: &str, value: &str) -> Result<()> {
        if self.values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        let previous = self.values.insert(key.to_string(), value.to_string());
        let result = self.flush();
        if result.is_err() {
            // Keep the map in step with what is on disk
            self.restore(key, previous);
        }
        result
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let Some(previous) = self.values.remove(key) else {
            return Ok(());
        };
        let result = self.flush();
        if result.is_err() {
            self.restore(key, Some(previous));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_read_write() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read_string(KEY_ACTIVE_TAB), None);

        store.write_string(KEY_ACTIVE_TAB, "todo").unwrap();
        assert_eq!(store.read_string(KEY_ACTIVE_TAB).as_deref(), Some("todo"));

        store.remove(KEY_ACTIVE_TAB).unwrap();
        assert_eq!(store.read_string(KEY_ACTIVE_TAB), None);
    }

    #[test]
    fn test_typed_reads_reject_malformed_values() {
        let mut store = MemoryStore::new();
        store.write_string(KEY_DARK_MODE, "yes").unwrap();
        store.write_string(KEY_TIMER_MINUTES, "-3").unwrap();
        store.write_string(KEY_TIMER_SECONDS, " 12 ").unwrap();

        assert_eq!(read_bool(&store, KEY_DARK_MODE), None);
        assert_eq!(read_u32(&store, KEY_TIMER_MINUTES), None);
        assert_eq!(read_u32(&store, KEY_TIMER_SECONDS), Some(12));
        assert_eq!(read_bool(&store, KEY_TIMER_RUNNING), None);
    }

    #[test]
    fn test_json_documents() {
        let mut store = MemoryStore::new();
        write_json(&mut store, KEY_TODOS, &vec!["a", "b"]).unwrap();
        let back: Option<Vec<String>> = read_json(&store, KEY_TODOS);
        assert_eq!(back, Some(vec!["a".to_string(), "b".to_string()]));

        store.write_string(KEY_NOTES, "{not json").unwrap();
        let notes: Option<Vec<String>> = read_json(&store, KEY_NOTES);
        assert!(notes.is_none());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileStore::open(&path).unwrap();
        store.write_string(KEY_ACTIVE_TAB, "audio").unwrap();
        store.write_string(KEY_DARK_MODE, "true").unwrap();
        drop(store);

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.read_string(KEY_ACTIVE_TAB).as_deref(), Some("audio"));
        assert_eq!(read_bool(&store, KEY_DARK_MODE), Some(true));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "this is not json").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.read_string(KEY_ACTIVE_TAB), None);

        // First write replaces the corrupt file
        store.write_string(KEY_ACTIVE_TAB, "todo").unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.read_string(KEY_ACTIVE_TAB).as_deref(), Some("todo"));
    }

    #[test]
    fn test_file_store_write_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // Parent is a regular file, so the directory cannot be created
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let mut store = FileStore::open(blocker.join("storage.json")).unwrap();
        assert!(store.write_string(KEY_ACTIVE_TAB, "todo").is_err());
    }

    #[test]
    fn test_file_store_retries_after_failed_write() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("state");
        let path = parent.join("storage.json");
        fs::write(&parent, "").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.write_string(KEY_ACTIVE_TAB, "todo").is_err());
        assert_eq!(store.read_string(KEY_ACTIVE_TAB), None);

        // Once the directory can be created the same value must reach disk
        fs::remove_file(&parent).unwrap();
        store.write_string(KEY_ACTIVE_TAB, "todo").unwrap();
        assert!(path.exists());
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.read_string(KEY_ACTIVE_TAB).as_deref(), Some("todo"));
    }

    #[test]
    fn test_file_store_failed_remove_keeps_value() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("state");
        let path = parent.join("storage.json");

        let mut store = FileStore::open(&path).unwrap();
        store.write_string(KEY_DARK_MODE, "true").unwrap();

        fs::remove_dir_all(&parent).unwrap();
        fs::write(&parent, "").unwrap();
        assert!(store.remove(KEY_DARK_MODE).is_err());
        assert_eq!(read_bool(&store, KEY_DARK_MODE), Some(true));
    }
}
