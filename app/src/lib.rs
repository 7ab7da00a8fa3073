//! SimpleGov host application.
//!
//! Wires the governance module to a bank and a stake table over one
//! key-value store and drives it through the block lifecycle:
//! `init_chain` → (`begin_block` → `deliver_tx`* → `end_block` → `commit`)*.
//!
//! Ordering, signature verification and block production are upstream
//! concerns; this crate applies whatever ordered, authenticated blocks it is
//! handed and produces the same app hash on every replica.

pub mod app;
pub mod bank;
pub mod block;
pub mod config;
pub mod error;
pub mod genesis;
pub mod logging;
pub mod stake;
pub mod tx;

pub use app::{compute_app_hash, GovApp};
pub use bank::{KvBank, SendMsg};
pub use block::{Block, BlockOutcome};
pub use config::AppConfig;
pub use error::{AppError, StakeError};
pub use genesis::{AppGenesis, GenesisAccount, GenesisStake, StakeGenesis};
pub use logging::{init_logging, LogFormat};
pub use stake::{BondMsg, KvStake, StakeParams, StakeRecord, UnbondMsg};
pub use tx::{AppMsg, Tx, TxResult};
