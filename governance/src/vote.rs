//! Vote options and recorded votes.

use serde::{Deserialize, Serialize};
use simplegov_types::{Address, BlockHeight, ProposalId};
use std::fmt;
use std::str::FromStr;

use crate::error::GovernanceError;

/// The three ways a staker can vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteOption {
    /// In favour of the proposal.
    Yes,
    /// Against the proposal.
    No,
    /// Counted towards turnout, but neither for nor against.
    Abstain,
}

impl VoteOption {
    pub const ALL: [VoteOption; 3] = [VoteOption::Yes, VoteOption::No, VoteOption::Abstain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Abstain => "Abstain",
        }
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteOption {
    type Err = GovernanceError;

    /// Exact, case-sensitive match on `Yes`, `No` or `Abstain`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(Self::Yes),
            "No" => Ok(Self::No),
            "Abstain" => Ok(Self::Abstain),
            other => Err(GovernanceError::InvalidVoteOption(other.to_string())),
        }
    }
}

/// A voter's live vote on a proposal. A later vote by the same voter on the
/// same proposal replaces this record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub voter: Address,
    pub option: VoteOption,
    /// Voting power snapshotted when the vote was cast.
    pub weight: u64,
    pub cast_at: BlockHeight,
}
