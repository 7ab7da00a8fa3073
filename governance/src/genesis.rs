//! Governance genesis import and export.
//!
//! The exported state carries every proposal with its full vote set, the id
//! counter and the module parameters, which is everything needed to resume
//! after a restart. The resolution queue is not exported: it is rebuilt from
//! the `Open` proposals in id order on import.

use serde::{Deserialize, Serialize};
use simplegov_store::{encode, KvStore};
use simplegov_types::{Coins, ProposalId};
use std::collections::BTreeSet;

use crate::error::GovernanceError;
use crate::keys;
use crate::keeper::stored_params;
use crate::proposal::{Proposal, Tally};
use crate::proposal_store::ProposalStore;
use crate::vote::Vote;
use crate::vote_store::VoteStore;
use crate::GovParams;

/// A proposal together with the live votes cast on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisProposal {
    pub proposal: Proposal,
    #[serde(default)]
    pub votes: Vec<Vote>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    #[serde(default)]
    pub params: GovParams,
    #[serde(default = "first_proposal_id")]
    pub next_proposal_id: ProposalId,
    #[serde(default)]
    pub proposals: Vec<GenesisProposal>,
}

fn first_proposal_id() -> ProposalId {
    ProposalId::FIRST
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            params: GovParams::default(),
            next_proposal_id: ProposalId::FIRST,
            proposals: Vec::new(),
        }
    }
}

impl GenesisState {
    pub fn with_params(params: GovParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Sum of the deposits still escrowed by open proposals. `None` on
    /// overflow.
    pub fn open_deposits(&self) -> Option<Coins> {
        self.proposals
            .iter()
            .filter(|entry| entry.proposal.is_open())
            .try_fold(Coins::empty(), |acc, entry| {
                acc.checked_add(&entry.proposal.deposit)
            })
    }

    /// Check internal consistency before anything is written.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        self.params.validate()?;
        if self.next_proposal_id < ProposalId::FIRST {
            return Err(invalid("next_proposal_id must be at least 1".into()));
        }

        let mut seen = BTreeSet::new();
        for entry in &self.proposals {
            let p = &entry.proposal;
            if !seen.insert(p.id) {
                return Err(invalid(format!("duplicate proposal {}", p.id)));
            }
            if p.id < ProposalId::FIRST || p.id >= self.next_proposal_id {
                return Err(invalid(format!(
                    "proposal {} is outside the allocated range (next id {})",
                    p.id, self.next_proposal_id
                )));
            }
            if p.title.is_empty() || p.description.is_empty() {
                return Err(invalid(format!("proposal {} has an empty title or description", p.id)));
            }
            if p.voting_window == 0 {
                return Err(invalid(format!("proposal {} has a zero voting window", p.id)));
            }
            if p.is_open() && !p.deposit.is_positive() {
                return Err(invalid(format!("open proposal {} has no deposit", p.id)));
            }
            if !p.is_open() && p.resolved_at.is_none() {
                return Err(invalid(format!("resolved proposal {} lacks resolved_at", p.id)));
            }

            let mut voters = BTreeSet::new();
            let mut tally = Tally::default();
            for vote in &entry.votes {
                if vote.proposal_id != p.id {
                    return Err(invalid(format!(
                        "vote by {} for proposal {} is listed under proposal {}",
                        vote.voter, vote.proposal_id, p.id
                    )));
                }
                if vote.voter.is_empty() || !voters.insert(vote.voter.clone()) {
                    return Err(invalid(format!(
                        "proposal {} has an empty or repeated voter {:?}",
                        p.id,
                        vote.voter.as_str()
                    )));
                }
                tally
                    .add(vote.option, vote.weight)
                    .ok_or(GovernanceError::TallyOverflow(p.id))?;
            }
            if tally != p.tally {
                return Err(invalid(format!(
                    "proposal {} tally {:?} does not match its votes {:?}",
                    p.id, p.tally, tally
                )));
            }
        }
        Ok(())
    }
}

fn invalid(reason: String) -> GovernanceError {
    GovernanceError::InvalidGenesis(reason)
}

/// Write `genesis` into an empty governance namespace.
pub fn init_genesis<S: KvStore>(store: &S, genesis: &GenesisState) -> Result<(), GovernanceError> {
    genesis.validate()?;

    store.put(keys::PARAMS_KEY, &encode(&genesis.params)?)?;
    let proposals = ProposalStore::new(store);
    let votes = VoteStore::new(store);
    proposals.set_next_id(genesis.next_proposal_id)?;

    let mut entries: Vec<&GenesisProposal> = genesis.proposals.iter().collect();
    entries.sort_by_key(|entry| entry.proposal.id);
    for entry in entries {
        proposals.put(&entry.proposal)?;
        for vote in &entry.votes {
            votes.put(vote)?;
        }
        if entry.proposal.is_open() {
            proposals.enqueue(entry.proposal.id, entry.proposal.voting_end())?;
        }
    }

    tracing::info!(
        proposals = genesis.proposals.len(),
        next_proposal_id = %genesis.next_proposal_id,
        "governance genesis loaded"
    );
    Ok(())
}

/// Snapshot the governance namespace.
pub fn export_genesis<S: KvStore>(store: &S) -> Result<GenesisState, GovernanceError> {
    let proposals = ProposalStore::new(store);
    let votes = VoteStore::new(store);

    let mut entries = Vec::new();
    for proposal in proposals.all()? {
        let proposal_votes = votes.votes(proposal.id)?;
        entries.push(GenesisProposal {
            proposal,
            votes: proposal_votes,
        });
    }

    Ok(GenesisState {
        params: stored_params(store)?,
        next_proposal_id: proposals.next_id()?,
        proposals: entries,
    })
}
