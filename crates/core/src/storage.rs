//! Key-value slot storage.
//!
//! The cart persists itself as a single string under a named key. Anything
//! that can read and overwrite such a slot can back a [`crate::CartStore`]:
//! the storefront uses the visitor's session, the CLI a JSON file, and tests
//! an in-memory map.

use std::collections::HashMap;

use thiserror::Error;

/// Errors a storage backend can report.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem or OS-level failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The value could not be encoded for storage.
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// The backend refused the write (quota, lost session, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A string-keyed store of string values.
///
/// Reads and writes are synchronous; implementations that talk to an async
/// backend buffer the slot and flush it separately.
pub trait SlotStorage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: SlotStorage + ?Sized> SlotStorage for &mut T {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory slot storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with one slot already filled.
    #[must_use]
    pub fn with_slot(key: &str, value: &str) -> Self {
        let mut slots = HashMap::new();
        slots.insert(key.to_string(), value.to_string());
        Self { slots }
    }

    /// Borrow the raw value of a slot.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl SlotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.read("cart").unwrap(), None);

        storage.write("cart", "[]").unwrap();
        assert_eq!(storage.read("cart").unwrap().as_deref(), Some("[]"));

        storage.write("cart", "[1]").unwrap();
        assert_eq!(storage.get("cart"), Some("[1]"));

        storage.remove("cart").unwrap();
        storage.remove("cart").unwrap();
        assert_eq!(storage.read("cart").unwrap(), None);
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn write_through<S: SlotStorage>(mut storage: S) {
            storage.write("k", "v").unwrap();
        }

        let mut storage = MemoryStorage::new();
        write_through(&mut storage);
        assert_eq!(storage.get("k"), Some("v"));
    }
}
