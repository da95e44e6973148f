//! Filesystem KV store: one file per key under a directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::KvStore;
use crate::{Error, Result};

/// Stores each value in `<root>/<key>.<extension>`.
///
/// The directory is created on first write, so a store can point at a model
/// directory that does not exist yet; reads from a missing directory simply
/// find nothing.
#[derive(Debug, Clone)]
pub struct FsKvStore {
    root: PathBuf,
    extension: String,
}

impl FsKvStore {
    /// Create a store rooted at `root` using `extension` for every file.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File extension (without the leading dot).
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of the file holding `key`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for keys that would escape the root directory
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(Error::InvalidInput(format!(
                "'{key}' cannot be used as an artifact file name"
            )));
        }
        Ok(self.root.join(format!("{key}.{}", self.extension)))
    }
}

impl KvStore for FsKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        // A key with no file name can never have been written.
        let Ok(path) = self.path_for(key) else {
            return Ok(None);
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::StorageError(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(|e| {
            Error::StorageError(format!(
                "Failed to create directory {}: {e}",
                self.root.display()
            ))
        })?;
        fs::write(&path, value)
            .map_err(|e| Error::StorageError(format!("Failed to write {}: {e}", path.display())))
    }

    fn delete(&self, key: &str) -> Result<()> {
        let Ok(path) = self.path_for(key) else {
            return Ok(());
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::StorageError(format!(
                "Failed to delete {}: {e}",
                path.display()
            ))),
        }
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.path_for(key).is_ok_and(|path| path.is_file()))
    }

    fn check_key(&self, key: &str) -> Result<()> {
        self.path_for(key).map(|_| ())
    }
}
