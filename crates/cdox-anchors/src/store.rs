//! Anchor store backends.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::AnchorKey;

/// Error raised by a persistent anchor store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read anchor map {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to write anchor map {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },

    #[error("anchor map {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Repository interface for the persistent key-to-anchor mapping.
///
/// Invariant: once reserved, the anchor for a key never changes; callers
/// must `lookup` before deriving a fresh anchor.
pub trait AnchorStore {
    /// Previously assigned anchor for `key`, if any.
    fn lookup(&self, key: &AnchorKey) -> Option<&str>;
    /// Record a freshly assigned anchor for `key`.
    fn reserve(&mut self, key: AnchorKey, anchor: String);
}

/// In-memory anchor store. Used by tests and by runs that opt out of
/// persistence; assignments are still deterministic, just not durable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reserved anchors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when nothing has been reserved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl AnchorStore for MemoryStore {
    fn lookup(&self, key: &AnchorKey) -> Option<&str> {
        self.map.get(&key.to_string()).map(String::as_str)
    }

    fn reserve(&mut self, key: AnchorKey, anchor: String) {
        self.map.insert(key.to_string(), anchor);
    }
}

/// Anchor store persisted as a flat JSON object keyed
/// `<file>::<name>::<category>`.
///
/// Loaded once at startup; mutations stay in memory until [`save`] writes
/// the whole map back. A missing file on load is an empty store, not an
/// error, so first runs need no setup.
///
/// [`save`]: JsonFileStore::save
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    map: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Load the store from `path`, or start empty when the file is absent.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let map = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StoreError::Read {
                    path,
                    source,
                });
            }
        };
        Ok(Self { path, map })
    }

    /// Write the full map back to disk, creating parent directories.
    pub fn save(&self) -> Result<(), StoreError> {
        let write_err = |source: io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json =
            serde_json::to_string_pretty(&self.map).expect("string map serializes to JSON");
        fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AnchorStore for JsonFileStore {
    fn lookup(&self, key: &AnchorKey) -> Option<&str> {
        self.map.get(&key.to_string()).map(String::as_str)
    }

    fn reserve(&mut self, key: AnchorKey, anchor: String) {
        self.map.insert(key.to_string(), anchor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdox_model::Category;

    fn key(name: &str) -> AnchorKey {
        AnchorKey::new("a.h", name, Category::Function)
    }

    #[test]
    fn test_memory_store_lookup_after_reserve() {
        let mut store = MemoryStore::new();
        assert!(store.lookup(&key("f")).is_none());
        store.reserve(key("f"), "function-f-abc".to_owned());
        assert_eq!(store.lookup(&key("f")), Some("function-f-abc"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::load(dir.path().join("anchors.json")).unwrap();
        assert!(store.lookup(&key("f")).is_none());
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/anchors.json");

        let mut store = JsonFileStore::load(&path).unwrap();
        store.reserve(key("f"), "function-f-abc".to_owned());
        store.save().unwrap();

        let reloaded = JsonFileStore::load(&path).unwrap();
        assert_eq!(reloaded.lookup(&key("f")), Some("function-f-abc"));
    }

    #[test]
    fn test_json_store_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFileStore::load(&path),
            Err(StoreError::Malformed { .. })
        ));
    }
}
