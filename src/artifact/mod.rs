//! Model artifact store keyed by `(feature, family)`
//!
//! Artifacts are serialized [`Model`]s stored in a byte-level [`KvStore`] under
//! `"{feature}_{family}"`. On disk that is one file per pair inside the model
//! directory, e.g. `f1_ridge.model.json`.
//!
//! ```rust
//! use ensemble_signal::artifact::{ArtifactKey, ArtifactStore};
//! use ensemble_signal::config::TrainingConfig;
//! use ensemble_signal::kv::MemoryKvStore;
//! use ensemble_signal::model::Family;
//!
//! let store = ArtifactStore::new(MemoryKvStore::new());
//! let key = ArtifactKey::new("f1", Family::Ridge);
//! assert!(store.try_get(&key)?.is_none());
//!
//! let model = Family::Ridge.fit(&TrainingConfig::default(), &[1.0, 2.0, 3.0], &[0.0, 0.0, 1.0])?;
//! store.put(&key, &model)?;
//! assert!(store.exists(&key)?);
//! assert_eq!(store.get(&key)?, model);
//! # Ok::<(), ensemble_signal::Error>(())
//! ```

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::config::{ArtifactCompression, ArtifactConfig};
use crate::kv::{FsKvStore, KvStore};
use crate::model::{Family, Model};
use crate::{Error, Result};

/// Identifies one artifact: a feature column and a classifier family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactKey {
    feature: String,
    family: Family,
}

impl ArtifactKey {
    /// Create a key.
    #[must_use]
    pub fn new(feature: impl Into<String>, family: Family) -> Self {
        Self {
            feature: feature.into(),
            family,
        }
    }

    /// Feature name.
    #[must_use]
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// Classifier family.
    #[must_use]
    pub const fn family(&self) -> Family {
        self.family
    }

    /// Key used in the underlying store: `"{feature}_{family}"`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.feature, self.family)
    }

    fn not_found(&self) -> Error {
        Error::ArtifactNotFound {
            feature: self.feature.clone(),
            family: self.family.to_string(),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.feature, self.family)
    }
}

/// Persists and retrieves fitted models.
#[derive(Debug)]
pub struct ArtifactStore<S: KvStore> {
    inner: S,
}

impl<S: KvStore> ArtifactStore<S> {
    /// Wrap a byte-level store.
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Underlying byte store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Persist `model` under `key`, replacing any previous artifact.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the model's family differs from the key's,
    /// or any storage/serialization error
    pub fn put(&self, key: &ArtifactKey, model: &Model) -> Result<()> {
        if model.family() != key.family {
            return Err(Error::InvalidInput(format!(
                "cannot store a {} model under {key}",
                model.family()
            )));
        }
        let bytes = model.to_bytes()?;
        debug!(artifact = %key, bytes = bytes.len(), "storing artifact");
        self.inner.set(&key.storage_key(), bytes)
    }

    /// Check that `key` can be stored in the backend.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the backend cannot name an artifact for `key`
    pub fn check_key(&self, key: &ArtifactKey) -> Result<()> {
        self.inner.check_key(&key.storage_key())
    }

    /// Whether an artifact exists for `key`.
    ///
    /// # Errors
    ///
    /// Returns storage errors from the backend
    pub fn exists(&self, key: &ArtifactKey) -> Result<bool> {
        self.inner.exists(&key.storage_key())
    }

    /// Load the artifact for `key`.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactNotFound` if nothing is stored under `key`, and
    /// `StorageError` if the stored bytes are corrupt or belong to another family
    pub fn get(&self, key: &ArtifactKey) -> Result<Model> {
        self.try_get(key)?.ok_or_else(|| key.not_found())
    }

    /// Load the artifact for `key`, or `None` when absent.
    ///
    /// A key the backend cannot name reads as absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored bytes are corrupt or belong to
    /// another family
    pub fn try_get(&self, key: &ArtifactKey) -> Result<Option<Model>> {
        let Some(bytes) = self.inner.get(&key.storage_key())? else {
            return Ok(None);
        };
        let model = Model::from_bytes(&bytes)?;
        if model.family() != key.family {
            return Err(Error::StorageError(format!(
                "artifact {key} holds a {} model",
                model.family()
            )));
        }
        Ok(Some(model))
    }

    /// Remove the artifact for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns storage errors from the backend
    pub fn remove(&self, key: &ArtifactKey) -> Result<()> {
        self.inner.delete(&key.storage_key())
    }
}

/// Open the artifact store for a model directory.
///
/// # Errors
///
/// Returns `InvalidInput` when compression is configured but the crate was
/// built without the `compression` feature
pub fn open_dir<P: AsRef<Path>>(
    dir: P,
    config: &ArtifactConfig,
) -> Result<ArtifactStore<Box<dyn KvStore>>> {
    let fs = FsKvStore::new(dir.as_ref(), config.file_extension());
    let inner: Box<dyn KvStore> = match config.compression {
        ArtifactCompression::None => Box::new(fs),
        #[cfg(feature = "compression")]
        ArtifactCompression::Lz4 => Box::new(crate::kv::CompressedKvStore::new(
            fs,
            crate::kv::Compression::Lz4,
        )),
        #[cfg(feature = "compression")]
        ArtifactCompression::Zstd => Box::new(crate::kv::CompressedKvStore::new(
            fs,
            crate::kv::Compression::Zstd,
        )),
        #[cfg(not(feature = "compression"))]
        other => {
            return Err(Error::InvalidInput(format!(
                "artifact compression {other:?} requires the `compression` feature"
            )))
        }
    };
    Ok(ArtifactStore::new(inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;
    use crate::kv::MemoryKvStore;

    fn fitted(family: Family) -> Model {
        family
            .fit(
                &TrainingConfig::default(),
                &[1.0, 2.0, 3.0, 10.0],
                &[0.0, 0.0, 1.0, 1.0],
            )
            .unwrap()
    }

    #[test]
    fn test_storage_key_concatenates_names() {
        let key = ArtifactKey::new("rsi_14", Family::Forest);
        assert_eq!(key.storage_key(), "rsi_14_forest");
        assert_eq!(key.to_string(), "rsi_14_forest");
        assert_eq!(key.feature(), "rsi_14");
        assert_eq!(key.family(), Family::Forest);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = ArtifactStore::new(MemoryKvStore::new());
        let err = store.get(&ArtifactKey::new("f1", Family::Logit)).unwrap_err();
        assert!(err.is_not_found());
        assert!(store.try_get(&ArtifactKey::new("f1", Family::Logit)).unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let store = ArtifactStore::new(MemoryKvStore::new());
        let key = ArtifactKey::new("f1", Family::Ridge);
        store.put(&key, &fitted(Family::Ridge)).unwrap();

        let other = Family::Ridge
            .fit(&TrainingConfig::default(), &[5.0, 1.0], &[0.0, 1.0])
            .unwrap();
        store.put(&key, &other).unwrap();
        assert_eq!(store.get(&key).unwrap(), other);
        assert_eq!(store.inner().len(), 1);
    }

    #[test]
    fn test_put_rejects_family_mismatch() {
        let store = ArtifactStore::new(MemoryKvStore::new());
        let err = store
            .put(&ArtifactKey::new("f1", Family::Forest), &fitted(Family::Ridge))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_get_detects_foreign_family() {
        let store = ArtifactStore::new(MemoryKvStore::new());
        let bytes = fitted(Family::Ridge).to_bytes().unwrap();
        store.inner().set("f1_logit", bytes).unwrap();

        let err = store.get(&ArtifactKey::new("f1", Family::Logit)).unwrap_err();
        assert!(matches!(err, Error::StorageError(_)));
    }

    #[test]
    fn test_remove() {
        let store = ArtifactStore::new(MemoryKvStore::new());
        let key = ArtifactKey::new("f1", Family::Logit);
        store.put(&key, &fitted(Family::Logit)).unwrap();
        store.remove(&key).unwrap();
        assert!(!store.exists(&key).unwrap());
    }

    #[test]
    fn test_open_dir_writes_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_dir(dir.path(), &ArtifactConfig::default()).unwrap();
        store
            .put(&ArtifactKey::new("f1", Family::Ridge), &fitted(Family::Ridge))
            .unwrap();
        assert!(dir.path().join("f1_ridge.model.json").is_file());
    }

    #[test]
    fn test_unnameable_key_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_dir(dir.path(), &ArtifactConfig::default()).unwrap();
        let key = ArtifactKey::new("ret/vol", Family::Ridge);

        assert!(store.try_get(&key).unwrap().is_none());
        assert!(!store.exists(&key).unwrap());
        assert!(matches!(store.check_key(&key), Err(Error::InvalidInput(_))));
        assert!(store.check_key(&ArtifactKey::new("ret", Family::Ridge)).is_ok());
    }

    #[cfg(not(feature = "compression"))]
    #[test]
    fn test_open_dir_compression_needs_feature() {
        let config = ArtifactConfig {
            compression: ArtifactCompression::Lz4,
            ..ArtifactConfig::default()
        };
        assert!(matches!(
            open_dir("/tmp/unused", &config),
            Err(Error::InvalidInput(_))
        ));
    }
}
