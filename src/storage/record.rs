//! Record Store
//!
//! Reads and writes single record files as JSON.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tokio::fs;

use crate::error::{Result, StoreError};

/// File-level access to records below the storage area
///
/// Holds no state besides the root path; every call goes straight to the
/// filesystem.
#[derive(Debug, Clone)]
pub struct RecordStore {
    /// Storage area root
    root: PathBuf,
}

impl RecordStore {
    /// Create a record store rooted at the storage area
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write a record, creating the collection directory if needed
    ///
    /// Any existing file is replaced wholesale.
    pub async fn write<T>(&self, collection: &str, key: &str, record: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let path = self.record_path(collection, key);
        match fs::write(&path, &data).await {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(self.collection_dir(collection)).await?;
                fs::write(&path, &data).await?;
            }
            other => other?,
        }

        Ok(())
    }

    /// Read a record
    ///
    /// Returns:
    /// - `Ok(Some(value))`: record parsed
    /// - `Ok(Some(Value::Null))`: file exists but is not valid JSON
    /// - `Ok(None)`: no such file
    pub async fn read(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let path = self.record_path(collection, key);

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&data) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(collection, key, error = %e, "Unparseable record, returning empty value");
                Ok(Some(Value::Null))
            }
        }
    }

    /// Remove a file or a whole directory tree
    ///
    /// Returns `true` if something was there. Removing nothing is not an error.
    pub async fn remove(path: &Path) -> Result<bool> {
        let metadata = match fs::symlink_metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let removed = if metadata.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };

        match removed {
            Ok(()) => Ok(true),
            // Lost a race with another remover
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// List entry names of a directory; a missing directory lists as empty
    pub async fn list(dir: &Path) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => {
                    tracing::warn!(dir = %dir.display(), name = ?name, "Skipping non UTF-8 entry");
                }
            }
        }

        Ok(names)
    }

    /// Check whether a path exists
    pub async fn exists(path: &Path) -> Result<bool> {
        match fs::symlink_metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Path Helpers
    // =========================================================================

    /// Storage area root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a collection
    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    /// File holding a record
    pub fn record_path(&self, collection: &str, key: &str) -> PathBuf {
        self.root.join(collection).join(key)
    }
}
