//! Proposal lifecycle controller, the only writer of governance state.

use serde::{Deserialize, Serialize};
use simplegov_store::{decode, encode, KvStore};
use simplegov_types::{Address, BlockHeight, Coins, ProposalId};

use crate::error::GovernanceError;
use crate::expected::{BankError, CoinKeeper, StakeKeeper};
use crate::keys;
use crate::params::{ForfeitPolicy, GovParams};
use crate::proposal::{Proposal, ProposalState, Tally};
use crate::proposal_store::ProposalStore;
use crate::tally::TallyOutcome;
use crate::vote::{Vote, VoteOption};
use crate::vote_store::VoteStore;

/// Name of the module account that escrows deposits.
pub const MODULE_NAME: &str = "gov";

/// What happened to a resolved proposal's deposit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// Returned to the submitter.
    Refunded(Address),
    /// Removed from circulation.
    Burned,
    /// Credited to the community pool.
    Forfeited(Address),
}

/// Result of resolving one proposal at end of block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub proposal_id: ProposalId,
    pub outcome: TallyOutcome,
    pub tally: Tally,
    pub deposit: Coins,
    pub disposition: Disposition,
}

/// Parameters persisted in a governance namespace (defaults if none).
pub fn stored_params<S: KvStore>(store: &S) -> Result<GovParams, GovernanceError> {
    match store.get(keys::PARAMS_KEY)? {
        Some(bytes) => Ok(decode(&bytes)?),
        None => Ok(GovParams::default()),
    }
}

/// Governance keeper over a namespaced store, a coin subsystem and a stake
/// subsystem.
///
/// Every method reads and writes through `store`; the host is expected to
/// hand in a transaction-scoped cache and drop it when a method fails, so a
/// failed call never leaves partial state behind.
pub struct Keeper<S, C, K> {
    store: S,
    coins: C,
    stake: K,
    params: GovParams,
}

impl<S: KvStore, C: CoinKeeper, K: StakeKeeper> Keeper<S, C, K> {
    /// Fails with `InvalidParams` unless `params` pass [`GovParams::validate`].
    pub fn new(store: S, coins: C, stake: K, params: GovParams) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            store,
            coins,
            stake,
            params,
        })
    }

    /// Build a keeper with the parameters persisted in `store`.
    pub fn load(store: S, coins: C, stake: K) -> Result<Self, GovernanceError> {
        let params = stored_params(&store)?;
        Self::new(store, coins, stake, params)
    }

    pub fn set_params(&mut self, params: GovParams) -> Result<(), GovernanceError> {
        params.validate()?;
        self.store.put(keys::PARAMS_KEY, &encode(&params)?)?;
        self.params = params;
        Ok(())
    }

    pub fn params(&self) -> &GovParams {
        &self.params
    }

    /// Account holding deposits while proposals are open.
    pub fn escrow_address() -> Address {
        Address::module(MODULE_NAME)
    }

    pub fn proposals(&self) -> ProposalStore<&S> {
        ProposalStore::new(&self.store)
    }

    pub fn votes(&self) -> VoteStore<&S> {
        VoteStore::new(&self.store)
    }

    pub fn voting_power_of(&self, voter: &Address) -> Result<u64, GovernanceError> {
        Ok(self.stake.voting_power_of(voter)?)
    }

    // ── Submission ──────────────────────────────────────────────────────

    /// Escrow `deposit` from `submitter` and open a new proposal.
    ///
    /// `voting_window` falls back to the module default when `None`.
    pub fn submit_proposal(
        &self,
        title: &str,
        description: &str,
        submitter: &Address,
        height: BlockHeight,
        voting_window: Option<u64>,
        deposit: Coins,
    ) -> Result<ProposalId, GovernanceError> {
        if !deposit.is_valid() || !deposit.is_positive() {
            return Err(GovernanceError::InvalidDeposit(format!(
                "deposit must be a positive coin amount, got {deposit:?}"
            )));
        }
        let voting_window = voting_window.unwrap_or(self.params.default_voting_window);
        if voting_window == 0 {
            return Err(GovernanceError::InvalidVotingWindow);
        }

        self.coins
            .debit(submitter, &deposit)
            .map_err(GovernanceError::from)?;
        self.coins
            .credit(&Self::escrow_address(), &deposit)
            .map_err(GovernanceError::from)?;

        let proposals = self.proposals();
        let id = proposals.allocate_id()?;
        let proposal = Proposal::new(
            id,
            title,
            description,
            submitter.clone(),
            height,
            voting_window,
            deposit,
        );
        proposals.put(&proposal)?;
        proposals.enqueue(id, proposal.voting_end())?;

        tracing::info!(
            proposal = %id,
            submitter = %submitter,
            deposit = %proposal.deposit,
            voting_end = %proposal.voting_end(),
            "proposal submitted"
        );
        Ok(id)
    }

    // ── Voting ──────────────────────────────────────────────────────────

    /// Record `voter`'s vote, replacing any earlier vote on the same proposal.
    pub fn cast_vote(
        &self,
        proposal_id: ProposalId,
        option: VoteOption,
        voter: &Address,
        weight: u64,
        height: BlockHeight,
    ) -> Result<(), GovernanceError> {
        let proposals = self.proposals();
        let votes = self.votes();

        let mut proposal = proposals
            .get(proposal_id)?
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;
        if !proposal.is_open() {
            return Err(GovernanceError::VotingClosed(proposal_id));
        }

        if let Some(prior) = votes.get(proposal_id, voter)? {
            proposal
                .tally
                .remove(prior.option, prior.weight)
                .ok_or(GovernanceError::TallyOverflow(proposal_id))?;
            tracing::debug!(
                proposal = %proposal_id,
                voter = %voter,
                previous = %prior.option,
                previous_weight = prior.weight,
                "replacing earlier vote"
            );
        }
        proposal
            .tally
            .add(option, weight)
            .ok_or(GovernanceError::TallyOverflow(proposal_id))?;

        votes.put(&Vote {
            proposal_id,
            voter: voter.clone(),
            option,
            weight,
            cast_at: height,
        })?;
        proposals.put(&proposal)?;

        tracing::debug!(
            proposal = %proposal_id,
            voter = %voter,
            option = %option,
            weight,
            "vote recorded"
        );
        Ok(())
    }

    // ── Resolution ──────────────────────────────────────────────────────

    /// Resolve every queued proposal whose window has elapsed at `height`,
    /// in queue order.
    ///
    /// Any error is fatal for the block: the caller must not commit.
    pub fn end_block(&self, height: BlockHeight) -> Result<Vec<Resolution>, GovernanceError> {
        let mut resolutions = Vec::new();
        for (id, voting_end) in self.proposals().queue()? {
            if voting_end > height {
                continue;
            }
            resolutions.push(self.resolve(id, height)?);
        }
        Ok(resolutions)
    }

    fn resolve(&self, id: ProposalId, height: BlockHeight) -> Result<Resolution, GovernanceError> {
        let proposals = self.proposals();
        let mut proposal = proposals.get(id)?.ok_or_else(|| {
            GovernanceError::Store(simplegov_store::StoreError::Corruption(format!(
                "queued proposal {id} has no record"
            )))
        })?;
        if proposal.state != ProposalState::Open {
            return Err(GovernanceError::Store(
                simplegov_store::StoreError::Corruption(format!(
                    "queued proposal {id} is already {}",
                    proposal.state
                )),
            ));
        }

        let outcome = proposal.tally.decide(&self.params);
        let deposit = std::mem::take(&mut proposal.deposit);
        let disposition = self.dispose(&proposal, &deposit, outcome).map_err(|e| {
            tracing::error!(proposal = %id, error = %e, "deposit disposition failed");
            GovernanceError::Disposition {
                id,
                reason: e.to_string(),
            }
        })?;

        proposal.state = outcome.into();
        proposal.resolved_at = Some(height);
        proposals.put(&proposal)?;
        proposals.dequeue(id)?;

        tracing::info!(
            proposal = %id,
            outcome = %outcome,
            yes = proposal.tally.yes,
            no = proposal.tally.no,
            abstain = proposal.tally.abstain,
            deposit = %deposit,
            height = %height,
            "proposal resolved"
        );

        Ok(Resolution {
            proposal_id: id,
            outcome,
            tally: proposal.tally,
            deposit,
            disposition,
        })
    }

    fn dispose(
        &self,
        proposal: &Proposal,
        deposit: &Coins,
        outcome: TallyOutcome,
    ) -> Result<Disposition, BankError> {
        let escrow = Self::escrow_address();
        self.coins.debit(&escrow, deposit)?;
        match (outcome, &self.params.forfeit) {
            (TallyOutcome::Passed, _) => {
                self.coins.credit(&proposal.submitter, deposit)?;
                Ok(Disposition::Refunded(proposal.submitter.clone()))
            }
            (TallyOutcome::Rejected, ForfeitPolicy::Burn) => Ok(Disposition::Burned),
            (TallyOutcome::Rejected, ForfeitPolicy::CommunityPool(pool)) => {
                self.coins.credit(pool, deposit)?;
                Ok(Disposition::Forfeited(pool.clone()))
            }
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn proposal(&self, id: ProposalId) -> Result<Option<Proposal>, GovernanceError> {
        Ok(self.proposals().get(id)?)
    }

    pub fn proposal_votes(&self, id: ProposalId) -> Result<Vec<Vote>, GovernanceError> {
        Ok(self.votes().votes(id)?)
    }

    /// Ids still awaiting resolution, in queue order.
    pub fn open_proposals(&self) -> Result<Vec<ProposalId>, GovernanceError> {
        Ok(self
            .proposals()
            .queue()?
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }
}

impl From<BankError> for GovernanceError {
    fn from(e: BankError) -> Self {
        match e {
            BankError::InsufficientFunds { .. } => GovernanceError::InsufficientFunds(e.to_string()),
            BankError::InvalidCoins(msg) => GovernanceError::InvalidDeposit(msg),
            BankError::AccountBlocked(address) => {
                GovernanceError::InsufficientFunds(format!("account {address} is blocked"))
            }
            BankError::Store(e) => GovernanceError::Store(e),
        }
    }
}
