//! One live vote per (proposal, voter).

use simplegov_store::{decode, encode, KvStore, StoreError};
use simplegov_types::{Address, ProposalId};

use crate::keys;
use crate::vote::Vote;

pub struct VoteStore<S> {
    store: S,
}

impl<S: KvStore> VoteStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn get(&self, id: ProposalId, voter: &Address) -> Result<Option<Vote>, StoreError> {
        self.store
            .get(&keys::vote_key(id, voter))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Write `vote`, replacing the voter's previous vote on the same proposal.
    pub fn put(&self, vote: &Vote) -> Result<(), StoreError> {
        self.store
            .put(&keys::vote_key(vote.proposal_id, &vote.voter), &encode(vote)?)
    }

    /// All votes on proposal `id`, ordered by voter address bytes.
    pub fn votes(&self, id: ProposalId) -> Result<Vec<Vote>, StoreError> {
        self.store
            .iter_prefix(&keys::votes_prefix(id))?
            .into_iter()
            .map(|(_, bytes)| decode(&bytes))
            .collect()
    }
}
