//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::kv::LmdbKvStore;
use crate::LmdbError;

const KV_DB_NAME: &str = "kv";
const META_DB_NAME: &str = "meta";
const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Wraps the LMDB environment and its database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    kv_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// On-disk layout version written by this build.
    pub const SCHEMA_VERSION: u32 = 1;

    /// Open or create an LMDB environment at the given path.
    ///
    /// A fresh environment is stamped with [`Self::SCHEMA_VERSION`]; an
    /// existing one must carry the same version.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per path by this process and
        // never concurrently by another `Env` in the same process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let kv_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(KV_DB_NAME))?;
        let meta_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(META_DB_NAME))?;

        let recorded = meta_db
            .get(&wtxn, SCHEMA_VERSION_KEY)?
            .map(decode_version)
            .transpose()?;
        match recorded {
            None => {
                meta_db.put(
                    &mut wtxn,
                    SCHEMA_VERSION_KEY,
                    &Self::SCHEMA_VERSION.to_le_bytes(),
                )?;
                tracing::info!(path = %path.display(), version = Self::SCHEMA_VERSION, "initialised LMDB environment");
            }
            Some(found) if found != Self::SCHEMA_VERSION => {
                return Err(LmdbError::SchemaMismatch {
                    found,
                    expected: Self::SCHEMA_VERSION,
                });
            }
            Some(found) => {
                tracing::debug!(path = %path.display(), version = found, "opened LMDB environment");
            }
        }
        wtxn.commit()?;

        Ok(Self {
            env: Arc::new(env),
            kv_db,
            meta_db,
        })
    }

    /// The ledger's key-value store.
    pub fn kv_store(&self) -> LmdbKvStore {
        LmdbKvStore::new(Arc::clone(&self.env), self.kv_db)
    }

    /// The schema version recorded in the environment.
    pub fn schema_version(&self) -> Result<u32, LmdbError> {
        let rtxn = self.env.read_txn()?;
        match self.meta_db.get(&rtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) => decode_version(bytes),
            None => Ok(0),
        }
    }

    pub fn env(&self) -> &Env {
        &self.env
    }
}

fn decode_version(bytes: &[u8]) -> Result<u32, LmdbError> {
    let arr: [u8; 4] = bytes.try_into().map_err(|_| {
        LmdbError::Serialization("schema_version has unexpected byte length".to_string())
    })?;
    Ok(u32::from_le_bytes(arr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_environment_is_stamped() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 4, 1 << 20).unwrap();
        assert_eq!(env.schema_version().unwrap(), LmdbEnvironment::SCHEMA_VERSION);
    }

    #[test]
    fn reopening_keeps_the_stamp() {
        let dir = tempfile::tempdir().unwrap();
        drop(LmdbEnvironment::open(dir.path(), 4, 1 << 20).unwrap());
        let env = LmdbEnvironment::open(dir.path(), 4, 1 << 20).unwrap();
        assert_eq!(env.schema_version().unwrap(), LmdbEnvironment::SCHEMA_VERSION);
    }
}
