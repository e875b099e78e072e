//! Durable key-value storage for the cart and wishlist.
//!
//! The state manager writes each collection as one JSON document under a
//! fixed key (see [`keys`]). Two backends ship with the crate:
//! - [`FileStore`] - one `<key>.json` file per key in a state directory
//! - [`MemoryStore`] - a process-local map, used for session-only state and tests

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Storage keys used by the state manager.
pub mod keys {
    /// Key for the serialized cart line items.
    pub const CART: &str = "cart";

    /// Key for the serialized wishlist items.
    pub const WISHLIST: &str = "wishlist";
}

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// Value could not be encoded.
    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key contains characters that are not safe as a file name.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A durable string key-value store.
///
/// Implementations must be safe to share between threads; the state manager
/// calls them synchronously while holding its own lock.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Delete `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store. State lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with `entries`.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// File-backed store: each key is a `<key>.json` file in one directory.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a state directory.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The state directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(keys::CART).unwrap(), None);

        store.set(keys::CART, "[]").unwrap();
        assert_eq!(store.get(keys::CART).unwrap().as_deref(), Some("[]"));

        store.remove(keys::CART).unwrap();
        store.remove(keys::CART).unwrap();
        assert_eq!(store.get(keys::CART).unwrap(), None);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("state")).unwrap();

        assert_eq!(store.get(keys::WISHLIST).unwrap(), None);
        store.set(keys::WISHLIST, r#"[{"product_id":1}]"#).unwrap();
        assert_eq!(
            store.get(keys::WISHLIST).unwrap().as_deref(),
            Some(r#"[{"product_id":1}]"#)
        );
        assert!(store.dir().join("wishlist.json").exists());
        assert!(!store.dir().join("wishlist.json.tmp").exists());

        store.remove(keys::WISHLIST).unwrap();
        assert_eq!(store.get(keys::WISHLIST).unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(matches!(
            store.set("../escape", "x"),
            Err(PersistError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(PersistError::InvalidKey(_))));
    }
}
