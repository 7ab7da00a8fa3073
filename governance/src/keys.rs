//! Key layout of the governance namespace.
//!
//! ```text
//! params                          -> GovParams
//! next_proposal_id                -> ProposalId (next id to hand out)
//! proposal/<id:be64>              -> Proposal
//! vote/<id:be64>/<voter>          -> Vote
//! queue/<id:be64>                 -> BlockHeight (voting end)
//! ```
//!
//! Ids are big-endian so prefix iteration yields ascending id order. Ids are
//! allocated in submission order, so the queue iterates in insertion order.

use simplegov_types::{Address, ProposalId};

pub const PARAMS_KEY: &[u8] = b"params";
pub const NEXT_PROPOSAL_ID_KEY: &[u8] = b"next_proposal_id";
pub const PROPOSAL_PREFIX: &[u8] = b"proposal/";
pub const VOTE_PREFIX: &[u8] = b"vote/";
pub const QUEUE_PREFIX: &[u8] = b"queue/";

fn with_id(prefix: &[u8], id: ProposalId) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + 8);
    key.extend_from_slice(prefix);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

pub fn proposal_key(id: ProposalId) -> Vec<u8> {
    with_id(PROPOSAL_PREFIX, id)
}

/// Prefix shared by every vote on proposal `id`.
pub fn votes_prefix(id: ProposalId) -> Vec<u8> {
    let mut key = with_id(VOTE_PREFIX, id);
    key.push(b'/');
    key
}

pub fn vote_key(id: ProposalId, voter: &Address) -> Vec<u8> {
    let mut key = votes_prefix(id);
    key.extend_from_slice(voter.as_bytes());
    key
}

pub fn queue_key(id: ProposalId) -> Vec<u8> {
    with_id(QUEUE_PREFIX, id)
}

/// Recover the id from a `<prefix><id:be64>` key.
pub fn id_from_key(prefix: &[u8], key: &[u8]) -> Option<ProposalId> {
    let bytes: [u8; 8] = key.strip_prefix(prefix)?.try_into().ok()?;
    Some(ProposalId::from_be_bytes(bytes))
}
