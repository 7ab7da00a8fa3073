//! Abstract storage traits for the SimpleGov ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements [`KvStore`].
//! The rest of the codebase depends only on the trait, layered with:
//! - [`Prefixed`]: confines a module to its own key namespace;
//! - [`CacheKv`]: buffers the writes of one transaction so they can be
//!   committed together or dropped on failure.

pub mod cache;
pub mod codec;
pub mod error;
pub mod kv;
pub mod prefix;

#[cfg(test)]
mod testing;

pub use cache::{CacheKv, WriteSet};
pub use codec::{decode, encode};
pub use error::StoreError;
pub use kv::{BatchOp, KvStore};
pub use prefix::Prefixed;
