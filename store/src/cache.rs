//! Transaction-scoped write cache.
//!
//! # Usage
//!
//! ```ignore
//! let cache = CacheKv::new(&root);
//! run_message(&cache)?;   // reads see the cache's own writes
//! cache.commit()?;        // one write_batch against the parent
//! ```
//!
//! If the cache is dropped without calling [`CacheKv::commit`], every write
//! made through it is discarded and the parent is untouched.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::{BatchOp, KvStore, StoreError};

/// Writes buffered by a [`CacheKv`], detached from its parent.
///
/// Lets a host keep a block's pending writes between calls and re-attach
/// them to the store with [`CacheKv::with_writes`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteSet(BTreeMap<Vec<u8>, Option<Vec<u8>>>);

impl WriteSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key-ordered batch equivalent to the buffered writes.
    pub fn into_batch(self) -> Vec<BatchOp> {
        self.0
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOp::Put(key, value),
                None => BatchOp::Delete(key),
            })
            .collect()
    }
}

/// Buffers writes over a parent store until committed.
pub struct CacheKv<S> {
    parent: S,
    /// `Some(value)` for a buffered put, `None` for a buffered delete.
    pending: RefCell<BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
}

impl<S: KvStore> CacheKv<S> {
    pub fn new(parent: S) -> Self {
        Self {
            parent,
            pending: RefCell::new(BTreeMap::new()),
        }
    }

    /// Resume buffering on top of writes detached earlier.
    pub fn with_writes(parent: S, writes: WriteSet) -> Self {
        Self {
            parent,
            pending: RefCell::new(writes.0),
        }
    }

    /// Detach the buffered writes without touching the parent.
    pub fn into_writes(self) -> WriteSet {
        WriteSet(self.pending.into_inner())
    }

    /// Number of keys written (or deleted) through this cache.
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    /// Flush every buffered write to the parent as a single batch.
    pub fn commit(self) -> Result<(), StoreError> {
        let ops = WriteSet(self.pending.into_inner()).into_batch();
        if ops.is_empty() {
            return Ok(());
        }
        tracing::trace!(ops = ops.len(), "committing cached writes");
        self.parent.write_batch(ops)
    }
}

impl<S: KvStore> KvStore for CacheKv<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(buffered) = self.pending.borrow().get(key) {
            return Ok(buffered.clone());
        }
        self.parent.get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.pending
            .borrow_mut()
            .insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.pending.borrow_mut().insert(key.to_vec(), None);
        Ok(())
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.iter_prefix(prefix)?.into_iter().collect();
        let pending = self.pending.borrow();
        for (key, value) in pending
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
        {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}
