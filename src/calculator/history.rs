//! Calculation history and the key-value storage it is persisted to.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum number of entries kept; older ones are dropped.
pub const HISTORY_LIMIT: usize = 20;

/// Storage key the history is saved under.
pub const HISTORY_KEY: &str = "calcHistory";

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed storage data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable key-value storage holding JSON values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// A completed calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Expression text, e.g. `5 + 3` or `factorial(5)`.
    pub expression: String,
    /// Formatted result.
    pub result: String,
    pub timestamp: DateTime<Local>,
}

impl HistoryEntry {
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            result: result.into(),
            timestamp: Local::now(),
        }
    }
}

/// Bounded newest-first history, written through to a store.
pub struct History {
    entries: VecDeque<HistoryEntry>,
    store: Box<dyn KeyValueStore>,
}

impl History {
    /// Load the history from `store`. Missing or unreadable data starts empty.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let entries = match store.get(HISTORY_KEY) {
            Ok(Some(value)) => match serde_json::from_value::<Vec<HistoryEntry>>(value) {
                Ok(mut entries) => {
                    entries.truncate(HISTORY_LIMIT);
                    debug!(count = entries.len(), "Loaded calculation history");
                    entries.into()
                }
                Err(e) => {
                    warn!(error = %e, "Stored history has an unexpected shape, starting empty");
                    VecDeque::new()
                }
            },
            Ok(None) => VecDeque::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored history, starting empty");
                VecDeque::new()
            }
        };

        Self { entries, store }
    }

    /// Record an entry as the newest, evicting the oldest beyond the limit.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_LIMIT);
        self.save();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.save();
    }

    /// Entry at `index`, where 0 is the newest.
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Persist the entries. A storage failure is logged and the in-memory
    /// history stays authoritative.
    fn save(&mut self) {
        let value = match serde_json::to_value(&self.entries) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to serialize calculation history");
                return;
            }
        };

        if let Err(e) = self.store.set(HISTORY_KEY, value) {
            warn!(error = %e, "Failed to persist calculation history");
        }
    }
}

/// Store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every `set` rewrites the whole file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<data_dir>/calcpro/storage.json`.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calcpro")
            .join("storage.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<serde_json::Map<String, Value>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(serde_json::Map::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = serde_json::to_string_pretty(&values)?;
        fs::write(&self.path, contents).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store whose writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: PathBuf::from("/dev/null"),
                source: std::io::Error::other("read-only"),
            })
        }
    }

    #[test]
    fn test_newest_first() {
        let mut history = History::load(Box::new(MemoryStore::new()));
        history.push(HistoryEntry::new("1 + 1", "2"));
        history.push(HistoryEntry::new("2 + 2", "4"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0).unwrap().expression, "2 + 2");
        assert_eq!(history.get(1).unwrap().expression, "1 + 1");
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut history = History::load(Box::new(MemoryStore::new()));
        for i in 1..=25 {
            history.push(HistoryEntry::new(format!("{} + 0", i), i.to_string()));
        }

        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.get(0).unwrap().result, "25");
        assert_eq!(history.iter().last().unwrap().result, "6");
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut history = History::load(Box::new(JsonFileStore::new(&path)));
        history.push(HistoryEntry::new("5 × 2", "10"));
        history.push(HistoryEntry::new("sqrt(9)", "3"));

        let reloaded = History::load(Box::new(JsonFileStore::new(&path)));
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(0).unwrap().expression, "sqrt(9)");
        assert_eq!(reloaded.get(1).unwrap(), history.get(1).unwrap());
    }

    #[test]
    fn test_clear_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut history = History::load(Box::new(JsonFileStore::new(&path)));
        history.push(HistoryEntry::new("1 + 1", "2"));
        history.clear();

        let reloaded = History::load(Box::new(JsonFileStore::new(&path)));
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("storage.json"));
        store.set("theme", Value::from("dark")).unwrap();
        store.set(HISTORY_KEY, Value::Array(Vec::new())).unwrap();

        assert_eq!(store.get("theme").unwrap(), Some(Value::from("dark")));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_loads_from_fixed_key() {
        let mut store = MemoryStore::new();
        store
            .set(
                "calcHistory",
                serde_json::json!([{
                    "expression": "2 + 2",
                    "result": "4",
                    "timestamp": "2024-05-01T14:02:11+02:00"
                }]),
            )
            .unwrap();

        let history = History::load(Box::new(store));
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(0).unwrap().result, "4");
    }

    #[test]
    fn test_corrupt_data_starts_empty() {
        let mut store = MemoryStore::new();
        store
            .set(HISTORY_KEY, serde_json::json!({"not": "a list"}))
            .unwrap();

        let history = History::load(Box::new(store));
        assert!(history.is_empty());
    }

    #[test]
    fn test_unparseable_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ this is not json").unwrap();

        let history = History::load(Box::new(JsonFileStore::new(&path)));
        assert!(history.is_empty());
    }

    #[test]
    fn test_write_failure_keeps_memory() {
        let mut history = History::load(Box::new(BrokenStore));
        history.push(HistoryEntry::new("1 + 1", "2"));
        assert_eq!(history.len(), 1);
    }
}
