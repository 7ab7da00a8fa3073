//! LMDB implementation of KvStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use simplegov_store::{BatchOp, KvStore, StoreError};

use crate::LmdbError;

/// The ledger key space, backed by a single LMDB database.
///
/// Each single-key operation runs in its own LMDB transaction;
/// [`KvStore::write_batch`] applies a whole batch in one write transaction,
/// so a committed message or block is either fully on disk or not at all.
#[derive(Clone)]
pub struct LmdbKvStore {
    env: Arc<Env>,
    db: Database<Bytes, Bytes>,
}

impl LmdbKvStore {
    pub(crate) fn new(env: Arc<Env>, db: Database<Bytes, Bytes>) -> Self {
        Self { env, db }
    }

    /// Number of entries in the key space.
    pub fn len(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.db.len(&rtxn).map_err(LmdbError::from)?)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl KvStore for LmdbKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let value = self.db.get(&rtxn, key).map_err(LmdbError::from)?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.db.put(&mut wtxn, key, value).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.db.delete(&mut wtxn, key).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        if prefix.is_empty() {
            for entry in self.db.iter(&rtxn).map_err(LmdbError::from)? {
                let (key, value) = entry.map_err(LmdbError::from)?;
                results.push((key.to_vec(), value.to_vec()));
            }
        } else {
            for entry in self.db.prefix_iter(&rtxn, prefix).map_err(LmdbError::from)? {
                let (key, value) = entry.map_err(LmdbError::from)?;
                results.push((key.to_vec(), value.to_vec()));
            }
        }
        Ok(results)
    }

    fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let count = ops.len();
        for op in ops {
            match op {
                BatchOp::Put(key, value) => {
                    self.db.put(&mut wtxn, &key, &value).map_err(LmdbError::from)?;
                }
                BatchOp::Delete(key) => {
                    self.db.delete(&mut wtxn, &key).map_err(LmdbError::from)?;
                }
            }
        }
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(ops = count, "LMDB batch committed");
        Ok(())
    }
}
