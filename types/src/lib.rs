//! Fundamental types for the SimpleGov ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, multi-denomination coin amounts, block heights, proposal ids
//! and the per-block state commitment.

pub mod address;
pub mod coin;
pub mod error;
pub mod hash;
pub mod height;
pub mod id;

pub use address::Address;
pub use coin::{Coin, Coins};
pub use error::CoinError;
pub use hash::AppHash;
pub use height::BlockHeight;
pub use id::ProposalId;
