//! LMDB storage backend for the SimpleGov ledger.
//!
//! Implements [`simplegov_store::KvStore`] using the `heed` LMDB bindings.
//! The whole ledger lives in one LMDB database; modules are separated by key
//! prefix, not by database, so a single write transaction can span them.

pub mod environment;
pub mod error;
pub mod integrity;
pub mod kv;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use kv::LmdbKvStore;
