//! Shared memory store
//!
//! A flat key/value map persisted as one JSON document. Every mutation
//! rewrites the whole document before returning; there is no append log and
//! no transaction. Writers inside this process are serialized by a mutex,
//! writers in other processes are not (last full snapshot wins). A mutation
//! whose write fails leaves the in-process map unchanged.

use eyre::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub struct MemoryStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    /// Load the store from `path`. A missing or unparseable document yields an
    /// empty store; this never fails.
    pub fn init(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_document(&path);
        log::info!("Memory initialized with {} items from {}", entries.len(), path.display());

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Insert or overwrite `key`, then persist the full document
    pub fn store(&self, key: &str, value: Value) -> Result<()> {
        log::debug!("Memory storing '{}'", key);
        let mut entries = self.lock();
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value);
        self.save(&updated)?;
        *entries = updated;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// Copy of every entry; mutating it leaves the store untouched
    pub fn all(&self) -> Map<String, Value> {
        self.lock().clone()
    }

    /// Remove every entry and persist the empty document
    pub fn clear(&self) -> Result<()> {
        log::info!("Memory clearing all values");
        let mut entries = self.lock();
        self.save(&Map::new())?;
        entries.clear();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final flush on the way out
    pub fn shutdown(&self) -> Result<()> {
        let entries = self.lock();
        self.save(&entries)
    }

    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn save(&self, entries: &Map<String, Value>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create memory directory: {}", dir.display()))?;

        let json = serde_json::to_string_pretty(entries).context("Failed to serialize memory")?;

        // Write beside the target and rename so a crash never leaves half a document
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).context("Failed to create temporary memory file")?;
        tmp.write_all(json.as_bytes()).context("Failed to write memory")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to persist memory to {}", self.path.display()))?;

        Ok(())
    }
}

fn load_document(path: &Path) -> Map<String, Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            if path.exists() {
                log::warn!("Failed to read memory file {}: {}", path.display(), e);
            }
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            log::warn!("Memory file {} is not a JSON object, starting empty", path.display());
            Map::new()
        }
        Err(e) => {
            log::warn!("Memory file {} is corrupt ({}), starting empty", path.display(), e);
            Map::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_starts_empty() {
        let temp = TempDir::new().unwrap();
        let memory = MemoryStore::init(temp.path().join("memory.json"));
        assert!(memory.is_empty());
        assert!(!memory.path().exists());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("memory.json");
        fs::write(&path, "{not json").unwrap();

        let memory = MemoryStore::init(&path);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_store_survives_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("memory.json");

        let memory = MemoryStore::init(&path);
        memory.store("k", json!("v")).unwrap();
        memory.store("nested", json!({"a": [1, 2, {"b": true}]})).unwrap();

        let reloaded = MemoryStore::init(&path);
        assert_eq!(reloaded.get("k"), Some(json!("v")));
        assert_eq!(reloaded.get("nested"), Some(json!({"a": [1, 2, {"b": true}]})));
    }

    #[test]
    fn test_store_overwrites() {
        let temp = TempDir::new().unwrap();
        let memory = MemoryStore::init(temp.path().join("memory.json"));
        memory.store("k", json!(1)).unwrap();
        memory.store("k", json!(2)).unwrap();
        assert_eq!(memory.get("k"), Some(json!(2)));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_clear_survives_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("memory.json");

        let memory = MemoryStore::init(&path);
        memory.store("a", json!("x")).unwrap();
        memory.clear().unwrap();
        assert!(memory.all().is_empty());

        let reloaded = MemoryStore::init(&path);
        assert!(reloaded.all().is_empty());
    }

    #[test]
    fn test_all_returns_copy() {
        let temp = TempDir::new().unwrap();
        let memory = MemoryStore::init(temp.path().join("memory.json"));
        memory.store("a", json!("x")).unwrap();

        let mut snapshot = memory.all();
        snapshot.insert("b".to_string(), json!("y"));
        snapshot.remove("a");

        assert_eq!(memory.get("a"), Some(json!("x")));
        assert_eq!(memory.get("b"), None);
    }

    #[test]
    fn test_document_is_full_rewrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("memory.json");

        let memory = MemoryStore::init(&path);
        memory.store("a", json!("x")).unwrap();
        memory.store("b", json!("y")).unwrap();

        let on_disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, json!({"a": "x", "b": "y"}));
    }

    #[test]
    fn test_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("memory.json");
        let memory = MemoryStore::init(&path);
        memory.store("k", json!("v")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_failed_write_leaves_entries_unchanged() {
        let temp = TempDir::new().unwrap();
        // A plain file where the parent directory should be makes every save fail
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let memory = MemoryStore::init(blocker.join("memory.json"));

        assert!(memory.store("k", json!("v")).is_err());
        assert_eq!(memory.get("k"), None);
        assert!(memory.all().is_empty());
    }

    #[test]
    fn test_failed_clear_keeps_entries() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("store");
        let path = dir.join("memory.json");
        let memory = MemoryStore::init(&path);
        memory.store("k", json!("v")).unwrap();

        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, "not a directory").unwrap();

        assert!(memory.clear().is_err());
        assert_eq!(memory.get("k"), Some(json!("v")));
    }
}
