//! Key/value storage backends for persisted layouts.
//!
//! The layout engine treats storage as a synchronous string-keyed store with
//! no transactional guarantees. Backends take `&self` and use interior
//! mutability so one backend can be shared (via [`Arc`]) between several
//! layout stores; concurrent writers follow last-writer-wins.
//!
//! # Backends
//!
//! - [`MemoryStorage`]: in-process map, optionally with a byte quota to
//!   emulate a full or disabled store.
//! - [`FileStorage`] (feature `file-storage`): one JSON file per key.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Errors a storage backend can report.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage quota exceeded writing {key:?} ({needed} bytes needed, {available} available)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A synchronous string-keyed store.
pub trait StorageBackend {
    /// Read one value. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write one value, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete one key. Deleting a missing key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// List every key currently present.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;
}

impl<T: StorageBackend + ?Sized> StorageBackend for &T {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

// =========================================================================
// MemoryStorage
// =========================================================================

/// In-process storage backed by a sorted map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Unbounded in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses writes once keys plus values exceed `bytes`.
    ///
    /// A quota of zero behaves like disabled storage: every write fails.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::default(),
            quota: Some(bytes),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Bytes used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.lock().iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.lock();
        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(used);
            if needed > available {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    needed,
                    available,
                });
            }
        }
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// =========================================================================
// FileStorage
// =========================================================================

#[cfg(feature = "file-storage")]
pub use file::FileStorage;

#[cfg(feature = "file-storage")]
mod file {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    use super::{StorageBackend, StorageError, StorageResult};

    const EXTENSION: &str = "json";

    /// Directory-backed storage: each key is one `<key>.json` file.
    ///
    /// Writes go to a temporary file first and are renamed into place.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        dir: PathBuf,
    }

    impl FileStorage {
        /// Use `dir` for storage, creating it if needed.
        pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
            let dir = dir.into();
            fs::create_dir_all(&dir)?;
            Ok(Self { dir })
        }

        /// Storage directory.
        #[must_use]
        pub fn dir(&self) -> &Path {
            &self.dir
        }

        fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
            let valid = !key.is_empty()
                && key != "."
                && !key.contains("..")
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
            if !valid {
                return Err(StorageError::InvalidKey(key.to_owned()));
            }
            Ok(self.dir.join(format!("{key}.{EXTENSION}")))
        }
    }

    impl StorageBackend for FileStorage {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            let path = self.path_for(key)?;
            match fs::read_to_string(&path) {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            let path = self.path_for(key)?;
            let temp = path.with_extension(format!("{EXTENSION}.tmp"));
            fs::write(&temp, value)?;
            fs::rename(&temp, &path)?;
            Ok(())
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            let path = self.path_for(key)?;
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            }
        }

        fn keys(&self) -> StorageResult<Vec<String>> {
            let mut keys = Vec::new();
            for entry in fs::read_dir(&self.dir)? {
                let path = entry?.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    keys.push(stem.to_owned());
                }
            }
            keys.sort();
            Ok(keys)
        }

        fn name(&self) -> &'static str {
            "file"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_get_set_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.get("k").unwrap().is_none());
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
        storage.set("k", "w").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("w"));
        storage.remove("k").unwrap();
        assert!(storage.get("k").unwrap().is_none());
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn memory_keys_sorted() {
        let storage = MemoryStorage::new();
        storage.set("b", "1").unwrap();
        storage.set("a", "2").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.used_bytes(), 4);
    }

    #[test]
    fn quota_rejects_oversized_write() {
        let storage = MemoryStorage::with_quota(10);
        storage.set("k", "12345").unwrap();
        let err = storage.set("j", "123456").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 7, available: 4, .. }));
        // Replacing an existing key only counts the new value.
        storage.set("k", "123456789").unwrap();
    }

    #[test]
    fn zero_quota_is_disabled_storage() {
        let storage = MemoryStorage::with_quota(0);
        assert!(storage.set("k", "").is_err());
        assert!(storage.get("k").unwrap().is_none());
    }

    #[test]
    fn arc_shares_one_backend() {
        let shared = Arc::new(MemoryStorage::new());
        let a = Arc::clone(&shared);
        let b = Arc::clone(&shared);
        a.set("k", "from-a").unwrap();
        b.set("k", "from-b").unwrap();
        assert_eq!(a.get("k").unwrap().as_deref(), Some("from-b"));
        assert_eq!(a.name(), "memory");
    }

    #[test]
    fn boxed_trait_object_forwards() {
        let storage: Box<dyn StorageBackend> = Box::new(MemoryStorage::new());
        storage.set("k", "v").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["k".to_owned()]);
    }
}
