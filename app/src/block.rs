//! Blocks as fed to the application and what applying one produced.

use serde::{Deserialize, Serialize};
use simplegov_governance::Resolution;
use simplegov_types::{AppHash, BlockHeight};

use crate::tx::{Tx, TxResult};

/// An externally ordered block of transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: BlockHeight,
    #[serde(default)]
    pub txs: Vec<Tx>,
}

impl Block {
    pub fn new(height: BlockHeight, txs: Vec<Tx>) -> Self {
        Self { height, txs }
    }

    pub fn empty(height: BlockHeight) -> Self {
        Self::new(height, Vec::new())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOutcome {
    pub height: BlockHeight,
    pub results: Vec<TxResult>,
    pub resolutions: Vec<Resolution>,
    pub app_hash: AppHash,
}
