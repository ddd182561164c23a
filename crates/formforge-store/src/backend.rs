//! Key-value backends.
//!
//! [`KeyValueStore`] is the injected storage interface: string keys, string
//! values, synchronous `get`/`set`/`keys`/`delete`. It stands in for the
//! browser's origin-scoped local storage.
//!
//! ## Backends
//!
//! - [`InMemoryStore`] - Thread-safe map with an optional byte quota; the test fake
//! - [`FileStore`] - One file per key in a directory, named by the key's SHA-256

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use formforge_core::{FormforgeError, FormforgeResult, Settings, StorageBackendKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A synchronous string key-value store.
///
/// Implementations must be `Send + Sync` so one store can be shared between
/// HTTP handlers.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Returns the value stored under `key`, or `None`.
    fn get(&self, key: &str) -> FormforgeResult<Option<String>>;

    /// Stores `value` under `key`, overwriting silently.
    ///
    /// A rejected write (quota, I/O) is reported as
    /// [`FormforgeError::StorageWrite`].
    fn set(&self, key: &str, value: &str) -> FormforgeResult<()>;

    /// Returns every key currently stored, in no particular order.
    fn keys(&self) -> FormforgeResult<Vec<String>>;

    /// Removes `key`. Returns `true` if it existed.
    fn delete(&self, key: &str) -> FormforgeResult<bool>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> FormforgeResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> FormforgeResult<()> {
        (**self).set(key, value)
    }

    fn keys(&self) -> FormforgeResult<Vec<String>> {
        (**self).keys()
    }

    fn delete(&self, key: &str) -> FormforgeResult<bool> {
        (**self).delete(key)
    }
}

/// Builds the backend selected in the settings.
pub fn open_store(settings: &Settings) -> FormforgeResult<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match settings.storage.backend {
        StorageBackendKind::Memory => {
            let store = InMemoryStore::new();
            Arc::new(match settings.storage.quota_bytes {
                Some(quota) => store.with_quota(quota),
                None => store,
            })
        }
        StorageBackendKind::File => Arc::new(FileStore::open(&settings.storage.location)?),
    };
    tracing::debug!(backend = %settings.storage.backend, "Opened key-value store");
    Ok(store)
}

fn poisoned<T>(_: T) -> FormforgeError {
    FormforgeError::Storage("in-memory store lock poisoned".to_string())
}

/// A thread-safe in-memory store.
///
/// Clones share the same underlying map. With a quota set, a write that
/// would push the total size of keys and values past the quota is rejected,
/// emulating a browser storage limit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl InMemoryStore {
    /// Creates a new empty store without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the total size of stored keys and values, in bytes.
    #[must_use]
    pub const fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// The total size of stored keys and values, in bytes.
    pub fn used_bytes(&self) -> FormforgeResult<usize> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.iter().map(|(k, v)| k.len() + v.len()).sum())
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> FormforgeResult<Option<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> FormforgeResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(FormforgeError::StorageWrite(format!(
                    "quota of {quota} bytes exceeded ({needed} bytes needed)"
                )));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self) -> FormforgeResult<Vec<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.keys().cloned().collect())
    }

    fn delete(&self, key: &str) -> FormforgeResult<bool> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        Ok(entries.remove(key).is_some())
    }
}

const ENTRY_EXTENSION: &str = "entry";

/// One stored pair as written to disk.
#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    key: String,
    value: String,
}

/// A filesystem-backed store.
///
/// Each key is stored as `<sha256(key)>.entry` inside the directory, so any
/// key maps to a fixed-length, filesystem-safe name. The entry file holds
/// the original key next to the value. Writes go to a temporary file first
/// and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> FormforgeResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            FormforgeError::ConfigurationError(format!(
                "Cannot create storage directory '{}': {e}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    /// The directory holding the entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{digest:x}.{ENTRY_EXTENSION}"))
    }

    /// Reads the entry stored for `key`. A file whose entry names a
    /// different key is treated as absent.
    fn read_entry(&self, key: &str) -> FormforgeResult<Option<FileEntry>> {
        let path = self.key_path(key);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FormforgeError::IoError(e)),
        };
        let entry: FileEntry = serde_json::from_slice(&data).map_err(|e| {
            FormforgeError::Storage(format!("{}: unreadable entry: {e}", path.display()))
        })?;
        Ok((entry.key == key).then_some(entry))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> FormforgeResult<Option<String>> {
        Ok(self.read_entry(key)?.map(|entry| entry.value))
    }

    fn set(&self, key: &str, value: &str) -> FormforgeResult<()> {
        let path = self.key_path(key);
        let tmp = path.with_extension("tmp");
        let entry = FileEntry {
            key: key.to_string(),
            value: value.to_string(),
        };
        let data = serde_json::to_vec(&entry)
            .map_err(|e| FormforgeError::StorageWrite(format!("cannot encode entry: {e}")))?;
        fs::write(&tmp, data)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|e| FormforgeError::StorageWrite(format!("{}: {e}", path.display())))
    }

    fn keys(&self) -> FormforgeResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                continue;
            }
            match fs::read(&path).map(|data| serde_json::from_slice::<FileEntry>(&data)) {
                Ok(Ok(entry)) => keys.push(entry.key),
                Ok(Err(e)) => tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable entry"),
                Err(e) => return Err(FormforgeError::IoError(e)),
            }
        }
        Ok(keys)
    }

    fn delete(&self, key: &str) -> FormforgeResult<bool> {
        if self.read_entry(key)?.is_none() {
            return Ok(false);
        }
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FormforgeError::IoError(e)),
        }
    }
}
