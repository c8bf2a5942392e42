//! Copy-on-write overlay over a read-only parent store
//!
//! A [`CacheStore`] only ever holds a shared borrow of its parent. Writes land
//! in the overlay and reach the parent solely through [`ChangeSet::apply`],
//! which needs a mutable borrow the overlay cannot provide. Dropping the
//! overlay discards everything written to it.

use std::collections::BTreeMap;

use super::{KVStore, StorageResult, StoreIter};

/// Pending writes: `Some` is a set, `None` a delete
type Overlay = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

pub struct CacheStore<'a> {
    parent: &'a dyn KVStore,
    writes: Overlay,
}

impl<'a> CacheStore<'a> {
    pub fn new(parent: &'a dyn KVStore) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    /// Consume the overlay, releasing the parent borrow, and keep its writes
    pub fn into_changes(self) -> ChangeSet {
        ChangeSet {
            writes: self.writes,
        }
    }
}

impl KVStore for CacheStore<'_> {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(value) => Ok(value.clone()),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn iter_prefix(&self, prefix: &[u8]) -> StorageResult<StoreIter<'_>> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = self.parent.iter_prefix(prefix)?.collect();
        for (key, value) in self.writes.range(prefix.to_vec()..) {
            if !key.starts_with(prefix) {
                break;
            }
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(Box::new(merged.into_iter()))
    }
}

/// Writes captured from a [`CacheStore`], ready to be committed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    writes: Overlay,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Write every captured change into `store`, in key order
    pub fn apply(self, store: &mut dyn KVStore) -> StorageResult<()> {
        for (key, value) in self.writes {
            match value {
                Some(value) => store.set(&key, &value)?,
                None => store.delete(&key)?,
            }
        }
        Ok(())
    }
}
