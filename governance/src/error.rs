use simplegov_store::StoreError;
use simplegov_types::ProposalId;
use thiserror::Error;

/// Codespace reported alongside [`GovernanceError::code`].
pub const CODESPACE: &str = "gov";

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal title must not be empty")]
    InvalidTitle,

    #[error("proposal description must not be empty")]
    InvalidDescription,

    #[error("invalid deposit: {0}")]
    InvalidDeposit(String),

    #[error("invalid vote option {0:?}: expected Yes, No or Abstain")]
    InvalidVoteOption(String),

    #[error("unrecognized address {0:?}")]
    UnrecognizedAddress(String),

    #[error("invalid proposal id {0}: must be non-negative")]
    InvalidProposalId(i64),

    #[error("voting window must be at least one block")]
    InvalidVotingWindow,

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("voting on proposal {0} is closed")]
    VotingClosed(ProposalId),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("proposal id space exhausted")]
    IdOverflow,

    #[error("tally overflow on proposal {0}")]
    TallyOverflow(ProposalId),

    #[error("invalid governance parameters: {0}")]
    InvalidParams(String),

    #[error("invalid genesis state: {0}")]
    InvalidGenesis(String),

    #[error("deposit disposition for proposal {id} failed: {reason}")]
    Disposition { id: ProposalId, reason: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl GovernanceError {
    /// Stable machine-readable code surfaced with a rejected transaction.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidTitle => 1,
            Self::InvalidDescription => 2,
            Self::InvalidDeposit(_) => 3,
            Self::InvalidVoteOption(_) => 4,
            Self::UnrecognizedAddress(_) => 5,
            Self::InvalidProposalId(_) => 6,
            Self::InvalidVotingWindow => 7,
            Self::ProposalNotFound(_) => 8,
            Self::VotingClosed(_) => 9,
            Self::InsufficientFunds(_) => 10,
            Self::IdOverflow => 11,
            Self::TallyOverflow(_) => 12,
            Self::InvalidParams(_) => 13,
            Self::InvalidGenesis(_) => 14,
            Self::Disposition { .. } => 15,
            Self::Store(_) => 16,
        }
    }

    /// Errors that must halt block processing rather than reject a single
    /// transaction: replicas cannot agree on a state that skipped them.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Disposition { .. } | Self::Store(_))
    }
}
