//! Key-value storage backends for persisted collections.
//!
//! Each collection (timers, to-dos) is one serialized blob under a fixed
//! key. Backends read and rewrite blobs in full; there are no partial
//! updates and the last write wins.

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, error, trace};
use tempfile::NamedTempFile;

use crate::{Result, TickError};

/// A synchronous key-value store holding one text blob per key.
pub trait StorageBackend {
    /// Returns the blob stored under `key`, or `None` if the key has never
    /// been written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous blob.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store keeping one `<key>.json` file per key inside a data
/// directory. Writes go through a temporary file in the same directory and
/// are persisted atomically.
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `data_dir`, creating the directory if it
    /// does not exist yet.
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        if !data_dir.exists() {
            debug!("Data directory does not exist, creating: {}", data_dir.display());
            fs::create_dir_all(&data_dir).map_err(|e| {
                error!("Failed to create data directory: {}", e);
                TickError::DirectoryError {
                    path: data_dir.clone(),
                }
            })?;
        }

        Ok(FileStore { data_dir })
    }

    /// Helper method to get the file path for a key
    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.key_path(key);
        if !file_path.exists() {
            trace!("No file for key '{}', treating as absent", key);
            return Ok(None);
        }

        debug!("Reading key '{}' from {}", key, file_path.display());
        let content = fs::read_to_string(&file_path).map_err(|e| {
            error!("Failed to read {}: {}", file_path.display(), e);
            TickError::Io(e)
        })?;

        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let file_path = self.key_path(key);
        debug!("Writing key '{}' to {}", key, file_path.display());

        // Create a temporary file in the same directory (for atomic operation)
        let dir = file_path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            TickError::Io(e)
        })?;

        temp_file.write_all(value.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            TickError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            TickError::Io(e)
        })?;

        // Atomically move the temporary file to the target location
        temp_file.persist(&file_path).map_err(|e| {
            error!("Failed to persist file {}: {}", file_path.display(), e.error);
            TickError::Io(e.error)
        })?;

        trace!("Key '{}' written successfully", key);
        Ok(())
    }
}

/// In-memory store used as a test double.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf()).unwrap();

        assert!(store.get("items").unwrap().is_none());

        store.set("items", "[1,2,3]").unwrap();
        assert_eq!(store.get("items").unwrap().as_deref(), Some("[1,2,3]"));

        // Last write wins
        store.set("items", "[]").unwrap();
        assert_eq!(store.get("items").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_keys_are_independent() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("items", "timers").unwrap();
        store.set("todos", "todos").unwrap();

        assert_eq!(store.get("items").unwrap().as_deref(), Some("timers"));
        assert_eq!(store.get("todos").unwrap().as_deref(), Some("todos"));
    }

    #[test]
    fn test_file_store_creates_missing_data_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        let store = FileStore::new(nested.clone()).unwrap();
        assert!(nested.exists());
        assert!(store.get("items").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.get("items").unwrap().is_none());

        store.set("items", "x").unwrap();
        assert_eq!(store.get("items").unwrap().as_deref(), Some("x"));
    }
}
