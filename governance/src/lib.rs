//! Governance sub-ledger for SimpleGov.
//!
//! Addresses submit text proposals backed by a coin deposit, stakers cast
//! weighted votes while a proposal's voting window is open, and at the end of
//! every block the proposals whose window has elapsed are tallied and resolved:
//! the deposit is refunded on `Passed` and forfeited on `Rejected`.
//!
//! Lifecycle: `Open` → (exactly once, at end of block) → `Passed` | `Rejected`.
//!
//! The [`Keeper`] is the only writer of governance state. It reaches the coin
//! and stake subsystems through the [`CoinKeeper`] and [`StakeKeeper`] traits
//! and the key-value store through [`simplegov_store::KvStore`], so every
//! state change runs inside whatever atomic unit the host wraps around it.

pub mod error;
pub mod expected;
pub mod genesis;
pub mod handler;
pub mod keeper;
pub mod keys;
pub mod msgs;
pub mod params;
pub mod proposal;
pub mod proposal_store;
pub mod tally;
pub mod vote;
pub mod vote_store;

pub use error::GovernanceError;
pub use expected::{BankError, CoinKeeper, StakeKeeper};
pub use genesis::{export_genesis, init_genesis, GenesisProposal, GenesisState};
pub use handler::{handle_msg, GovMsg, HandlerOutcome};
pub use keeper::{stored_params, Disposition, Keeper, Resolution, MODULE_NAME};
pub use msgs::{SubmitProposalMsg, ValidVote, VoteMsg};
pub use params::{ForfeitPolicy, GovParams};
pub use proposal::{Proposal, ProposalState, Tally};
pub use proposal_store::ProposalStore;
pub use tally::{decide, TallyOutcome};
pub use vote::{Vote, VoteOption};
pub use vote_store::VoteStore;
