//! Key/value storage for the governance state machine
//!
//! Every replica executes the same sequence of reads and writes against a
//! [`KVStore`], so all implementations must iterate in ascending key order.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A raw key/value pair as stored
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Ordered iterator over a snapshot of store entries
pub type StoreIter<'a> = Box<dyn Iterator<Item = KvPair> + 'a>;

/// The core store trait every state backend implements
pub trait KVStore {
    /// Retrieve the value at `key`, if any
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Check if a key exists
    fn has(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Store `value` at `key`, replacing any previous value
    fn set(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Delete the value at `key`. Deleting a missing key is not an error.
    fn delete(&mut self, key: &[u8]) -> StorageResult<()>;

    /// Iterate all entries whose key starts with `prefix`, in ascending key order.
    ///
    /// The iterator borrows the store, so no writes can interleave with it.
    /// Callers that need to mutate while walking collect first.
    fn iter_prefix(&self, prefix: &[u8]) -> StorageResult<StoreIter<'_>>;
}

/// Extension trait for JSON encoded values
pub trait JsonStore: KVStore {
    /// Retrieve and deserialize the value at `key`
    fn get_json<T: DeserializeOwned>(&self, key: &[u8]) -> StorageResult<Option<T>> {
        match self.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a value at `key`
    fn set_json<T: Serialize>(&mut self, key: &[u8], value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, &bytes)
    }
}

// Implement JsonStore for anything that implements KVStore, trait objects included
impl<S: KVStore + ?Sized> JsonStore for S {}

pub mod cache_storage;
pub mod memory_storage;

pub use cache_storage::{CacheStore, ChangeSet};
pub use memory_storage::MemoryStore;
