//! Governance proposals and their lifecycle.

use serde::{Deserialize, Serialize};
use simplegov_types::{Address, BlockHeight, Coins, ProposalId};
use std::fmt;

use crate::vote::VoteOption;

/// Lifecycle state. `Open` transitions exactly once, at resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// Accepting votes; deposit held in escrow.
    Open,
    /// Resolved in favour; deposit refunded.
    Passed,
    /// Resolved against (or without quorum); deposit forfeited.
    Rejected,
}

impl ProposalState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Open)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Passed => "Passed",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running weight totals per option.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub yes: u128,
    pub no: u128,
    pub abstain: u128,
}

impl Tally {
    pub fn new(yes: u128, no: u128, abstain: u128) -> Self {
        Self { yes, no, abstain }
    }

    /// Total weight cast, abstentions included.
    pub fn turnout(&self) -> u128 {
        self.yes.saturating_add(self.no).saturating_add(self.abstain)
    }

    pub fn weight_of(&self, option: VoteOption) -> u128 {
        match option {
            VoteOption::Yes => self.yes,
            VoteOption::No => self.no,
            VoteOption::Abstain => self.abstain,
        }
    }

    fn slot(&mut self, option: VoteOption) -> &mut u128 {
        match option {
            VoteOption::Yes => &mut self.yes,
            VoteOption::No => &mut self.no,
            VoteOption::Abstain => &mut self.abstain,
        }
    }

    /// Count `weight` for `option`. `None` on overflow, leaving the tally unchanged.
    #[must_use]
    pub fn add(&mut self, option: VoteOption, weight: u64) -> Option<()> {
        let slot = self.slot(option);
        *slot = slot.checked_add(u128::from(weight))?;
        Some(())
    }

    /// Withdraw a previously counted `weight`. `None` if the option's total is
    /// smaller than `weight`, leaving the tally unchanged.
    #[must_use]
    pub fn remove(&mut self, option: VoteOption, weight: u64) -> Option<()> {
        let slot = self.slot(option);
        *slot = slot.checked_sub(u128::from(weight))?;
        Some(())
    }
}

/// A text proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub submitter: Address,
    /// Height of the block that included the submission.
    pub submit_block: BlockHeight,
    /// Number of blocks the proposal stays open.
    pub voting_window: u64,
    /// Escrowed deposit; emptied once disposed of at resolution.
    pub deposit: Coins,
    pub state: ProposalState,
    pub tally: Tally,
    /// Height at which the proposal was resolved, once it has been.
    #[serde(default)]
    pub resolved_at: Option<BlockHeight>,
}

impl Proposal {
    pub fn new(
        id: ProposalId,
        title: impl Into<String>,
        description: impl Into<String>,
        submitter: Address,
        submit_block: BlockHeight,
        voting_window: u64,
        deposit: Coins,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            submitter,
            submit_block,
            voting_window,
            deposit,
            state: ProposalState::Open,
            tally: Tally::default(),
            resolved_at: None,
        }
    }

    /// First height at which the proposal is due for resolution.
    pub fn voting_end(&self) -> BlockHeight {
        self.submit_block.saturating_add(self.voting_window)
    }

    pub fn is_open(&self) -> bool {
        self.state == ProposalState::Open
    }

    /// Whether the voting window has elapsed at `now`.
    pub fn window_elapsed(&self, now: BlockHeight) -> bool {
        self.submit_block.has_elapsed(self.voting_window, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Proposal {
        Proposal::new(
            ProposalId::new(1),
            "Raise block size",
            "Double it",
            Address::new("alice"),
            BlockHeight::new(100),
            10,
            Coins::single("coin", 100),
        )
    }

    #[test]
    fn new_proposal_is_open_with_zero_tally() {
        let p = sample();
        assert!(p.is_open());
        assert_eq!(p.tally, Tally::default());
        assert_eq!(p.voting_end(), BlockHeight::new(110));
        assert!(!p.window_elapsed(BlockHeight::new(109)));
        assert!(p.window_elapsed(BlockHeight::new(110)));
    }

    #[test]
    fn tally_add_and_remove_are_symmetric() {
        let mut tally = Tally::default();
        tally.add(VoteOption::Yes, 70).unwrap();
        tally.add(VoteOption::Abstain, 5).unwrap();
        assert_eq!(tally.turnout(), 75);

        tally.remove(VoteOption::Yes, 70).unwrap();
        tally.add(VoteOption::No, 70).unwrap();
        assert_eq!(tally, Tally::new(0, 70, 5));
    }

    #[test]
    fn tally_remove_refuses_underflow() {
        let mut tally = Tally::new(10, 0, 0);
        assert!(tally.remove(VoteOption::Yes, 11).is_none());
        assert_eq!(tally.yes, 10);
    }

    #[test]
    fn terminal_states() {
        assert!(!ProposalState::Open.is_terminal());
        assert!(ProposalState::Passed.is_terminal());
        assert!(ProposalState::Rejected.is_terminal());
    }
}
