//! Block height, the ledger's only clock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence number of a finalized block.
///
/// All time-based behaviour in the ledger (voting windows) is expressed as a
/// height comparison, never as wall-clock time.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(u64);

impl BlockHeight {
    pub const GENESIS: Self = Self(0);

    pub fn new(height: u64) -> Self {
        Self(height)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The height `blocks` after this one, clamped at `u64::MAX`.
    pub fn saturating_add(self, blocks: u64) -> Self {
        Self(self.0.saturating_add(blocks))
    }

    pub fn next(self) -> Self {
        self.saturating_add(1)
    }

    /// Whether a window of `blocks` opened at this height has elapsed at `now`.
    pub fn has_elapsed(&self, blocks: u64, now: BlockHeight) -> bool {
        now >= self.saturating_add(blocks)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BlockHeight {
    fn from(h: u64) -> Self {
        Self(h)
    }
}
