use std::collections::BTreeMap;

use super::{KVStore, StorageResult, StoreIter};

/// In-memory ordered store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        self.data.remove(key);
        Ok(())
    }

    fn iter_prefix(&self, prefix: &[u8]) -> StorageResult<StoreIter<'_>> {
        let prefix = prefix.to_vec();
        let iter = self
            .data
            .range(prefix.clone()..)
            .take_while(move |(key, _)| key.starts_with(&prefix))
            .map(|(key, value)| (key.clone(), value.clone()));
        Ok(Box::new(iter))
    }
}
