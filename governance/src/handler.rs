//! Message routing into the keeper.

use serde::{Deserialize, Serialize};
use simplegov_store::KvStore;
use simplegov_types::{Address, BlockHeight, ProposalId};

use crate::error::GovernanceError;
use crate::expected::{CoinKeeper, StakeKeeper};
use crate::keeper::Keeper;
use crate::msgs::{SubmitProposalMsg, VoteMsg};

/// Every message kind the governance module accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GovMsg {
    SubmitProposal(SubmitProposalMsg),
    Vote(VoteMsg),
}

impl GovMsg {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SubmitProposal(_) => "submit_proposal",
            Self::Vote(_) => "vote",
        }
    }

    pub fn signers(&self) -> Vec<Address> {
        match self {
            Self::SubmitProposal(msg) => msg.signers(),
            Self::Vote(msg) => msg.signers(),
        }
    }

    pub fn validate_basic(&self) -> Result<(), GovernanceError> {
        match self {
            Self::SubmitProposal(msg) => msg.validate_basic(),
            Self::Vote(msg) => msg.validate_basic().map(|_| ()),
        }
    }
}

/// Successful result of handling a governance message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerOutcome {
    ProposalSubmitted(ProposalId),
    VoteCast { proposal_id: ProposalId, weight: u64 },
}

/// Validate `msg` and apply it through `keeper` at block `height`.
///
/// The voter's weight is read from the stake subsystem here, at the time the
/// vote is cast, and stored with the vote.
pub fn handle_msg<S, C, K>(
    keeper: &Keeper<S, C, K>,
    height: BlockHeight,
    msg: &GovMsg,
) -> Result<HandlerOutcome, GovernanceError>
where
    S: KvStore,
    C: CoinKeeper,
    K: StakeKeeper,
{
    match msg {
        GovMsg::SubmitProposal(msg) => {
            msg.validate_basic()?;
            let id = keeper.submit_proposal(
                &msg.title,
                &msg.description,
                &msg.submitter,
                height,
                msg.voting_window,
                msg.deposit.clone(),
            )?;
            Ok(HandlerOutcome::ProposalSubmitted(id))
        }
        GovMsg::Vote(msg) => {
            let vote = msg.validate_basic()?;
            let weight = keeper.voting_power_of(&msg.voter)?;
            keeper.cast_vote(vote.proposal_id, vote.option, &msg.voter, weight, height)?;
            Ok(HandlerOutcome::VoteCast {
                proposal_id: vote.proposal_id,
                weight,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplegov_types::Coins;

    #[test]
    fn messages_are_tagged_by_kind_in_json() {
        let msg = GovMsg::Vote(VoteMsg::new(1, "Yes", Address::new("bob")));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "vote");
        assert_eq!(json["proposal_id"], 1);

        let back: GovMsg = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
        assert_eq!(back.kind(), "vote");
    }

    #[test]
    fn signers_are_the_acting_address() {
        let submit = GovMsg::SubmitProposal(SubmitProposalMsg::new(
            "t",
            "d",
            Coins::single("coin", 1),
            Address::new("alice"),
        ));
        assert_eq!(submit.signers(), vec![Address::new("alice")]);
    }
}
