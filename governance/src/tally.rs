//! The accept/reject decision over vote totals.
//!
//! `Passed` iff all of:
//! - some weight was cast (`yes + no + abstain > 0`);
//! - turnout reached the quorum;
//! - `yes` is strictly more than `threshold_bps` of the decisive weight
//!   (`yes + no`); abstentions count for turnout only.
//!
//! Otherwise `Rejected`. The decision is a pure function of the three totals
//! and the parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::params::{GovParams, BPS_DENOMINATOR};
use crate::proposal::{ProposalState, Tally};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TallyOutcome {
    Passed,
    Rejected,
}

impl From<TallyOutcome> for ProposalState {
    fn from(outcome: TallyOutcome) -> Self {
        match outcome {
            TallyOutcome::Passed => ProposalState::Passed,
            TallyOutcome::Rejected => ProposalState::Rejected,
        }
    }
}

impl fmt::Display for TallyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ProposalState::from(*self).fmt(f)
    }
}

/// Decide the outcome for the given totals.
pub fn decide(yes: u128, no: u128, abstain: u128, params: &GovParams) -> TallyOutcome {
    let turnout = yes.saturating_add(no).saturating_add(abstain);
    if turnout == 0 || turnout < u128::from(params.quorum) {
        return TallyOutcome::Rejected;
    }
    // yes / (yes + no) > t / D  <=>  yes * (D - t) > no * t
    // Validated params keep the threshold below the denominator.
    let threshold = u128::from(params.threshold_bps);
    let against = u128::from(BPS_DENOMINATOR.saturating_sub(params.threshold_bps));
    if yes.saturating_mul(against) > no.saturating_mul(threshold) {
        TallyOutcome::Passed
    } else {
        TallyOutcome::Rejected
    }
}

impl Tally {
    pub fn decide(&self, params: &GovParams) -> TallyOutcome {
        decide(self.yes, self.no, self.abstain, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(quorum: u64, threshold_bps: u32) -> GovParams {
        GovParams {
            quorum,
            threshold_bps,
            ..GovParams::default()
        }
    }

    #[test]
    fn no_votes_is_rejected() {
        assert_eq!(decide(0, 0, 0, &params(0, 5_000)), TallyOutcome::Rejected);
        assert_eq!(decide(0, 0, 0, &GovParams::default()), TallyOutcome::Rejected);
    }

    #[test]
    fn simple_majority() {
        let p = GovParams::default();
        assert_eq!(decide(70, 30, 0, &p), TallyOutcome::Passed);
        assert_eq!(decide(30, 70, 0, &p), TallyOutcome::Rejected);
        assert_eq!(decide(50, 50, 0, &p), TallyOutcome::Rejected);
    }

    #[test]
    fn abstentions_count_for_quorum_only() {
        let p = params(100, 5_000);
        assert_eq!(decide(10, 5, 80, &p), TallyOutcome::Rejected);
        assert_eq!(decide(10, 5, 85, &p), TallyOutcome::Passed);
        assert_eq!(decide(0, 0, 1_000, &p), TallyOutcome::Rejected);
    }

    #[test]
    fn supermajority_threshold() {
        let p = params(1, 6_667);
        assert_eq!(decide(66, 34, 0, &p), TallyOutcome::Rejected);
        assert_eq!(decide(67, 33, 0, &p), TallyOutcome::Passed);
    }

    #[test]
    fn extreme_weights_do_not_panic() {
        let p = GovParams::default();
        assert_eq!(decide(u128::MAX, 0, 0, &p), TallyOutcome::Passed);
        assert_eq!(decide(u128::MAX, u128::MAX, u128::MAX, &p), TallyOutcome::Rejected);
    }
}
