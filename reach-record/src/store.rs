//! Persisted key-value flags, e.g. per-scene visit counters.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use reach_core::{KeyValueStore, SceneId, StoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Int(i64),
    Text(String),
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, StoredValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            StoredValue::Int(v) => Some(*v),
            StoredValue::Text(_) => None,
        }
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), StoredValue::Int(value));
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            StoredValue::Text(v) => Some(v.clone()),
            StoredValue::Int(_) => None,
        }
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_string(), StoredValue::Text(value.to_string()));
    }

    fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn delete_key(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn save(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// JSON-file store. Changes stay in memory until `save`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Loads `path` if it exists, otherwise starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            inner: MemoryStore { values },
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.inner.get_int(key)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.inner.set_int(key, value)
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.inner.get_string(key)
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.inner.set_string(key, value)
    }

    fn has_key(&self, key: &str) -> bool {
        self.inner.has_key(key)
    }

    fn delete_key(&mut self, key: &str) {
        self.inner.delete_key(key)
    }

    fn save(&mut self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.inner.values)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Including this one.
    pub count: i64,
    pub first: bool,
}

/// Counts scene visits in a key-value store.
pub struct VisitTracker;

impl VisitTracker {
    fn key(scene: &SceneId) -> String {
        format!("visits.{}", scene.name)
    }

    pub fn record_visit(store: &mut dyn KeyValueStore, scene: &SceneId) -> Visit {
        let key = Self::key(scene);
        let count = store.get_int(&key).unwrap_or(0) + 1;
        store.set_int(&key, count);
        Visit {
            count,
            first: count == 1,
        }
    }

    pub fn visits(store: &dyn KeyValueStore, scene: &SceneId) -> i64 {
        store.get_int(&Self::key(scene)).unwrap_or(0)
    }

    pub fn reset(store: &mut dyn KeyValueStore, scene: &SceneId) {
        store.delete_key(&Self::key(scene));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::temp_path;

    #[test]
    fn typed_access() {
        let mut store = MemoryStore::new();
        store.set_int("a", 3);
        store.set_string("b", "hello");
        assert_eq!(store.get_int("a"), Some(3));
        assert_eq!(store.get_string("a"), None);
        assert_eq!(store.get_string("b").as_deref(), Some("hello"));
        store.delete_key("a");
        assert!(!store.has_key("a"));
    }

    #[test]
    fn file_store_round_trips_through_save() {
        let path = temp_path("prefs.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store.set_int("visits.Pointing", 2);
        store.set_string("participant", "P07");
        store.save().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_int("visits.Pointing"), Some(2));
        assert_eq!(reopened.get_string("participant").as_deref(), Some("P07"));
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let path = temp_path("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn first_visit_only_once() {
        let mut store = MemoryStore::new();
        let scene = SceneId::new(1, "Pointing");
        assert_eq!(
            VisitTracker::record_visit(&mut store, &scene),
            Visit {
                count: 1,
                first: true
            }
        );
        assert!(!VisitTracker::record_visit(&mut store, &scene).first);
        assert_eq!(VisitTracker::visits(&store, &scene), 2);
        VisitTracker::reset(&mut store, &scene);
        assert!(VisitTracker::record_visit(&mut store, &scene).first);
    }
}
