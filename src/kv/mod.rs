//! Byte-level key-value stores backing the artifact store
//!
//! Provides a small synchronous key-value interface with:
//! - A filesystem backend (one file per key) for model directories
//! - An in-memory backend for tests and embedding
//! - Optional transparent LZ4/ZSTD compression (`compression` feature)
//!
//! # Example
//!
//! ```rust
//! use ensemble_signal::kv::{KvStore, MemoryKvStore};
//!
//! let store = MemoryKvStore::new();
//! store.set("key", b"value".to_vec())?;
//! assert_eq!(store.get("key")?, Some(b"value".to_vec()));
//!
//! store.delete("key")?;
//! assert!(!store.exists("key")?);
//! # Ok::<(), ensemble_signal::Error>(())
//! ```

#[cfg(feature = "compression")]
mod compressed;
mod fs;
mod memory;

#[cfg(feature = "compression")]
pub use compressed::{Compression, CompressedKvStore};
pub use fs::FsKvStore;
pub use memory::MemoryKvStore;

use crate::Result;

/// Key-value store for opaque byte payloads.
///
/// Writes overwrite, deletes of missing keys are no-ops, and a missing key
/// reads as `None` rather than an error.
pub trait KvStore {
    /// Get a value by key.
    ///
    /// Returns `None` if the key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value for a key.
    ///
    /// Overwrites any existing value.
    fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Delete a key.
    ///
    /// No-op if the key doesn't exist.
    fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool>;

    /// Check that `key` can be written to this store.
    ///
    /// Stores without naming restrictions accept every key.
    fn check_key(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }

    fn check_key(&self, key: &str) -> Result<()> {
        (**self).check_key(key)
    }
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }

    fn check_key(&self, key: &str) -> Result<()> {
        (**self).check_key(key)
    }
}
