//! Inbound governance messages and their structural validation.
//!
//! `validate_basic` performs stateless checks only: no store access, no
//! existence checks. Stateful checks (funds, proposal exists, window open)
//! belong to the [`Keeper`](crate::Keeper).

use serde::{Deserialize, Serialize};
use simplegov_types::{Address, Coins, ProposalId};
use std::fmt;

use crate::error::GovernanceError;
use crate::vote::VoteOption;

/// Route under which the host registers the governance handler.
pub const ROUTE: &str = "gov";

/// Submit a new text proposal, escrowing `deposit` from `submitter`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitProposalMsg {
    pub title: String,
    pub description: String,
    pub deposit: Coins,
    pub submitter: Address,
    /// Blocks the proposal stays open; the module default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_window: Option<u64>,
}

impl SubmitProposalMsg {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        deposit: Coins,
        submitter: Address,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            deposit,
            submitter,
            voting_window: None,
        }
    }

    pub fn with_voting_window(mut self, blocks: u64) -> Self {
        self.voting_window = Some(blocks);
        self
    }

    pub fn validate_basic(&self) -> Result<(), GovernanceError> {
        if self.submitter.is_empty() {
            return Err(GovernanceError::UnrecognizedAddress(
                self.submitter.to_string(),
            ));
        }
        if self.title.is_empty() {
            return Err(GovernanceError::InvalidTitle);
        }
        if self.description.is_empty() {
            return Err(GovernanceError::InvalidDescription);
        }
        if !self.deposit.is_valid() {
            return Err(GovernanceError::InvalidDeposit(format!(
                "deposit {:?} is not a well-formed coin amount",
                self.deposit
            )));
        }
        if !self.deposit.is_positive() {
            return Err(GovernanceError::InvalidDeposit(format!(
                "deposit {:?} must be positive",
                self.deposit
            )));
        }
        if self.voting_window == Some(0) {
            return Err(GovernanceError::InvalidVotingWindow);
        }
        Ok(())
    }

    pub fn signers(&self) -> Vec<Address> {
        vec![self.submitter.clone()]
    }
}

impl fmt::Display for SubmitProposalMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubmitProposalMsg{{{}, {}}}", self.title, self.description)
    }
}

/// Cast (or replace) a vote on a proposal.
///
/// Fields are carried as received on the wire; [`VoteMsg::validate_basic`]
/// turns them into a [`ValidVote`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteMsg {
    pub proposal_id: i64,
    pub option: String,
    pub voter: Address,
}

/// A vote request that passed structural validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidVote {
    pub proposal_id: ProposalId,
    pub option: VoteOption,
}

impl VoteMsg {
    pub fn new(proposal_id: i64, option: impl Into<String>, voter: Address) -> Self {
        Self {
            proposal_id,
            option: option.into(),
            voter,
        }
    }

    pub fn validate_basic(&self) -> Result<ValidVote, GovernanceError> {
        if self.voter.is_empty() {
            return Err(GovernanceError::UnrecognizedAddress(self.voter.to_string()));
        }
        let proposal_id = u64::try_from(self.proposal_id)
            .map(ProposalId::new)
            .map_err(|_| GovernanceError::InvalidProposalId(self.proposal_id))?;
        let option = self.option.parse::<VoteOption>()?;
        Ok(ValidVote {
            proposal_id,
            option,
        })
    }

    pub fn signers(&self) -> Vec<Address> {
        vec![self.voter.clone()]
    }
}

impl fmt::Display for VoteMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VoteMsg{{{}, {}, {}}}",
            self.proposal_id, self.voter, self.option
        )
    }
}
