//! Namespaced view over a store.

use crate::{BatchOp, KvStore, StoreError};

/// A view of `inner` in which every key is transparently prefixed.
///
/// Each module mounts its state under its own prefix (`gov/`, `bank/`, ...);
/// keys returned by [`KvStore::iter_prefix`] have the namespace stripped.
pub struct Prefixed<S> {
    inner: S,
    prefix: Vec<u8>,
}

impl<S: KvStore> Prefixed<S> {
    pub fn new(inner: S, prefix: &[u8]) -> Self {
        Self {
            inner,
            prefix: prefix.to_vec(),
        }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.prefix.len() + key.len());
        full.extend_from_slice(&self.prefix);
        full.extend_from_slice(key);
        full
    }
}

impl<S: KvStore> KvStore for Prefixed<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(&self.full_key(key))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.inner.put(&self.full_key(key), value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.inner.delete(&self.full_key(key))
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let strip = self.prefix.len();
        Ok(self
            .inner
            .iter_prefix(&self.full_key(prefix))?
            .into_iter()
            .map(|(key, value)| (key[strip..].to_vec(), value))
            .collect())
    }

    fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), StoreError> {
        let ops = ops
            .into_iter()
            .map(|op| match op {
                BatchOp::Put(key, value) => BatchOp::Put(self.full_key(&key), value),
                BatchOp::Delete(key) => BatchOp::Delete(self.full_key(&key)),
            })
            .collect();
        self.inner.write_batch(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MapStore;

    #[test]
    fn namespaces_do_not_see_each_other() {
        let root = MapStore::default();
        let gov = Prefixed::new(&root, b"gov/");
        let bank = Prefixed::new(&root, b"bank/");

        gov.put(b"k", b"1").unwrap();
        bank.put(b"k", b"2").unwrap();

        assert_eq!(gov.get(b"k").unwrap(), Some(b"1".to_vec()));
        assert_eq!(bank.get(b"k").unwrap(), Some(b"2".to_vec()));
        assert_eq!(root.get(b"gov/k").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn iteration_strips_the_namespace() {
        let root = MapStore::default();
        let gov = Prefixed::new(&root, b"gov/");
        gov.write_batch(vec![
            BatchOp::Put(b"vote/2".to_vec(), b"b".to_vec()),
            BatchOp::Put(b"vote/1".to_vec(), b"a".to_vec()),
            BatchOp::Put(b"other".to_vec(), b"c".to_vec()),
        ])
        .unwrap();

        let entries = gov.iter_prefix(b"vote/").unwrap();
        assert_eq!(
            entries,
            vec![
                (b"vote/1".to_vec(), b"a".to_vec()),
                (b"vote/2".to_vec(), b"b".to_vec()),
            ]
        );
    }
}
