//! Proposals, the id counter and the resolution queue.

use simplegov_store::{decode, encode, KvStore, StoreError};
use simplegov_types::{BlockHeight, ProposalId};

use crate::error::GovernanceError;
use crate::keys;
use crate::proposal::Proposal;

/// Typed view of the proposal records in a governance namespace.
pub struct ProposalStore<S> {
    store: S,
}

impl<S: KvStore> ProposalStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn get(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError> {
        self.store
            .get(&keys::proposal_key(id))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    pub fn put(&self, proposal: &Proposal) -> Result<(), StoreError> {
        self.store
            .put(&keys::proposal_key(proposal.id), &encode(proposal)?)
    }

    /// Every stored proposal, in ascending id order.
    pub fn all(&self) -> Result<Vec<Proposal>, StoreError> {
        self.store
            .iter_prefix(keys::PROPOSAL_PREFIX)?
            .into_iter()
            .map(|(_, bytes)| decode(&bytes))
            .collect()
    }

    /// The id the next submission will receive.
    pub fn next_id(&self) -> Result<ProposalId, StoreError> {
        match self.store.get(keys::NEXT_PROPOSAL_ID_KEY)? {
            Some(bytes) => decode(&bytes),
            None => Ok(ProposalId::FIRST),
        }
    }

    pub fn set_next_id(&self, id: ProposalId) -> Result<(), StoreError> {
        self.store.put(keys::NEXT_PROPOSAL_ID_KEY, &encode(&id)?)
    }

    /// Hand out the next id and advance the persisted counter.
    pub fn allocate_id(&self) -> Result<ProposalId, GovernanceError> {
        let id = self.next_id()?;
        let next = id.next().ok_or(GovernanceError::IdOverflow)?;
        self.set_next_id(next)?;
        Ok(id)
    }

    /// Queue `id` for resolution once `voting_end` is reached.
    pub fn enqueue(&self, id: ProposalId, voting_end: BlockHeight) -> Result<(), StoreError> {
        self.store.put(&keys::queue_key(id), &encode(&voting_end)?)
    }

    pub fn dequeue(&self, id: ProposalId) -> Result<(), StoreError> {
        self.store.delete(&keys::queue_key(id))
    }

    /// Queued proposals with their voting end, in insertion order.
    pub fn queue(&self) -> Result<Vec<(ProposalId, BlockHeight)>, StoreError> {
        let mut queue = Vec::new();
        for (key, bytes) in self.store.iter_prefix(keys::QUEUE_PREFIX)? {
            let id = keys::id_from_key(keys::QUEUE_PREFIX, &key).ok_or_else(|| {
                StoreError::Corruption(format!("malformed queue key {key:?}"))
            })?;
            queue.push((id, decode(&bytes)?));
        }
        Ok(queue)
    }
}
