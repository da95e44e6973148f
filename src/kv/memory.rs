//! In-memory KV store implementation using `DashMap`.
//!
//! Data is lost when the store is dropped; use `FsKvStore` for model
//! directories that must outlive the process.

use super::KvStore;
use crate::Result;
use dashmap::DashMap;

/// In-memory key-value store.
///
/// # Example
///
/// ```rust
/// use ensemble_signal::kv::{KvStore, MemoryKvStore};
///
/// let store = MemoryKvStore::new();
/// store.set("price_ridge", b"{}".to_vec())?;
/// assert_eq!(store.len(), 1);
/// # Ok::<(), ensemble_signal::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    store: DashMap<String, Vec<u8>>,
}

impl MemoryKvStore {
    /// Create a new in-memory KV store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of entries in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.store.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.store.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.store.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_kv_len() {
        let store = MemoryKvStore::new();
        assert!(store.is_empty());

        store.set("b", vec![]).unwrap();
        store.set("a", vec![]).unwrap();
        assert_eq!(store.len(), 2);
        store.delete("a").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_kv_empty_value() {
        let store = MemoryKvStore::new();
        store.set("key", vec![]).unwrap();
        assert_eq!(store.get("key").unwrap(), Some(vec![]));
    }
}
