//! Compressed KV store wrapper
//!
//! Provides transparent LZ4/ZSTD compression for any `KvStore` backend.
//! Forest artifacts are highly repetitive JSON and shrink well.

use crate::kv::KvStore;
use crate::{Error, Result};

/// Compression algorithm for stored values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// LZ4 - Fast compression (default)
    #[default]
    Lz4,
    /// ZSTD - Better ratio, slower
    Zstd,
}

impl Compression {
    /// Get algorithm name as string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }

    /// Compress data using this algorithm
    ///
    /// # Errors
    /// Returns error if compression fails (e.g., ZSTD internal error)
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            Self::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
            Self::Zstd => zstd::encode_all(data, 3)
                .map_err(|e| Error::StorageError(format!("ZSTD compression failed: {e}"))),
        }
    }

    /// Decompress data using this algorithm
    ///
    /// # Errors
    /// Returns error if decompression fails (e.g., corrupted data)
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            Self::Lz4 => lz4_flex::decompress_size_prepended(data)
                .map_err(|e| Error::StorageError(format!("LZ4 decompression failed: {e}"))),
            Self::Zstd => zstd::decode_all(data)
                .map_err(|e| Error::StorageError(format!("ZSTD decompression failed: {e}"))),
        }
    }
}

/// Compressed KV store wrapper
///
/// Wraps any `KvStore` implementation and transparently compresses/decompresses values.
///
/// # Example
///
/// ```rust
/// use ensemble_signal::kv::{CompressedKvStore, Compression, KvStore, MemoryKvStore};
///
/// let store = CompressedKvStore::new(MemoryKvStore::new(), Compression::Lz4);
/// store.set("key", vec![0u8; 10000])?;
/// assert_eq!(store.get("key")?, Some(vec![0u8; 10000]));
/// # Ok::<(), ensemble_signal::Error>(())
/// ```
#[derive(Debug)]
pub struct CompressedKvStore<S: KvStore> {
    inner: S,
    compression: Compression,
}

impl<S: KvStore> CompressedKvStore<S> {
    /// Create a new compressed KV store wrapping the given store
    #[must_use]
    pub const fn new(inner: S, compression: Compression) -> Self {
        Self { inner, compression }
    }

    /// Get reference to inner store (for inspection/testing)
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Get compression algorithm
    #[must_use]
    pub const fn compression(&self) -> Compression {
        self.compression
    }
}

impl<S: KvStore> KvStore for CompressedKvStore<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner
            .get(key)?
            .map(|compressed| self.compression.decompress(&compressed))
            .transpose()
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let compressed = self.compression.compress(&value)?;
        self.inner.set(key, compressed)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(key)
    }

    fn check_key(&self, key: &str) -> Result<()> {
        self.inner.check_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;

    #[test]
    fn test_compression_as_str() {
        assert_eq!(Compression::Lz4.as_str(), "lz4");
        assert_eq!(Compression::Zstd.as_str(), "zstd");
    }

    #[test]
    fn test_round_trip_both_algorithms() {
        let data = br#"{"family":"forest","trees":[{"nodes":[]},{"nodes":[]}]}"#.repeat(50);
        for compression in [Compression::Lz4, Compression::Zstd] {
            let store = CompressedKvStore::new(MemoryKvStore::new(), compression);
            store.set("f1_forest", data.clone()).unwrap();

            let raw = store.inner().get("f1_forest").unwrap().unwrap();
            assert!(raw.len() < data.len() / 10);
            assert_eq!(store.get("f1_forest").unwrap(), Some(data.clone()));
        }
    }

    #[test]
    fn test_missing_key_stays_none() {
        let store = CompressedKvStore::new(MemoryKvStore::new(), Compression::Zstd);
        assert_eq!(store.get("absent").unwrap(), None);
        assert!(!store.exists("absent").unwrap());
    }

    #[test]
    fn test_corrupt_payload_is_storage_error() {
        let store = CompressedKvStore::new(MemoryKvStore::new(), Compression::Lz4);
        store.inner().set("bad", vec![10, 0, 0, 0, 0xf0]).unwrap();
        assert!(matches!(store.get("bad"), Err(Error::StorageError(_))));
    }
}
