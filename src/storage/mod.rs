//! Durable key/value storage that survives restarts, the terminal stand-in for
//! browser local storage. Reads are total: a missing or unreadable backing file is
//! reported as "no value" and never as an error, so corrupted local state can not
//! take the client down. Writes surface I/O failures to the caller.

pub mod session_store;

pub use session_store::{Session, SessionStore};

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError, RwLock},
};
use thiserror::Error;
use tracing::{debug, warn};

const STORAGE_FILE: &str = "local_storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Minimal `localStorage`-shaped interface.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an error if the value can not be persisted.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    /// Returns an error if the removal can not be persisted.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Writes several keys as one update where the backend supports it.
    ///
    /// # Errors
    /// Returns an error if the values can not be persisted.
    fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        entries
            .iter()
            .try_for_each(|(key, value)| self.set_item(key, value))
    }

    /// Removes several keys as one update where the backend supports it.
    ///
    /// # Errors
    /// Returns an error if the removal can not be persisted.
    fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError> {
        keys.iter().try_for_each(|key| self.remove_item(key))
    }
}

/// JSON file backed storage. Every read goes to disk so a value written by another
/// process (or a moment ago by this one) is always observed.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STORAGE_FILE),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Unable to read {}: {err}", self.path.display());
                }
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("Ignoring unreadable storage file {}: {err}", self.path.display());
            BTreeMap::new()
        })
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let payload = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        debug!("Persisted {} storage keys to {}", items.len(), self.path.display());
        Ok(())
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load();
        if apply(&mut items) {
            self.persist(&items)?;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.update(|items| items.remove(key).is_some())
    }

    fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        self.update(|items| {
            for (key, value) in entries {
                items.insert((*key).to_string(), (*value).to_string());
            }
            !entries.is_empty()
        })
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.update(|items| {
            keys.iter()
                .fold(false, |changed, key| items.remove(*key).is_some() || changed)
        })
    }
}

/// In-process storage, used for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }

    fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            items.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            items.remove(*key);
        }
        Ok(())
    }
}
