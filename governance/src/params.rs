//! Governance module parameters.
//!
//! Parameters are fixed at genesis and persisted in the module namespace;
//! there is no runtime amendment path.

use serde::{Deserialize, Serialize};
use simplegov_types::Address;

use crate::error::GovernanceError;

/// Voting window used when a submission does not carry one (two weeks of
/// one-second blocks).
pub const DEFAULT_VOTING_WINDOW: u64 = 1_209_600;

/// Minimum turnout (total weight cast, abstentions included).
pub const DEFAULT_QUORUM: u64 = 1;

/// Share of decisive (yes + no) weight that `yes` must strictly exceed, in
/// basis points. 5000 means a simple majority.
pub const DEFAULT_THRESHOLD_BPS: u32 = 5_000;

pub const BPS_DENOMINATOR: u32 = 10_000;

/// Where a rejected proposal's deposit goes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForfeitPolicy {
    /// Remove the deposit from circulation.
    Burn,
    /// Credit the deposit to a community pool account.
    CommunityPool(Address),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovParams {
    #[serde(default = "default_voting_window")]
    pub default_voting_window: u64,

    #[serde(default = "default_quorum")]
    pub quorum: u64,

    #[serde(default = "default_threshold_bps")]
    pub threshold_bps: u32,

    #[serde(default = "default_forfeit")]
    pub forfeit: ForfeitPolicy,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_voting_window() -> u64 {
    DEFAULT_VOTING_WINDOW
}

fn default_quorum() -> u64 {
    DEFAULT_QUORUM
}

fn default_threshold_bps() -> u32 {
    DEFAULT_THRESHOLD_BPS
}

fn default_forfeit() -> ForfeitPolicy {
    ForfeitPolicy::Burn
}

impl GovParams {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.default_voting_window == 0 {
            return Err(GovernanceError::InvalidParams(
                "default_voting_window must be at least one block".into(),
            ));
        }
        if self.threshold_bps >= BPS_DENOMINATOR {
            return Err(GovernanceError::InvalidParams(format!(
                "threshold_bps must be below {}, got {}",
                BPS_DENOMINATOR, self.threshold_bps
            )));
        }
        if let ForfeitPolicy::CommunityPool(pool) = &self.forfeit {
            if pool.is_empty() {
                return Err(GovernanceError::InvalidParams(
                    "community pool address must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for GovParams {
    fn default() -> Self {
        Self {
            default_voting_window: default_voting_window(),
            quorum: default_quorum(),
            threshold_bps: default_threshold_bps(),
            forfeit: default_forfeit(),
        }
    }
}
