use simplegov_governance::{BankError, GovernanceError};
use simplegov_store::StoreError;
use simplegov_store_lmdb::LmdbError;
use simplegov_types::{Address, BlockHeight};
use thiserror::Error;

/// Codespace of errors raised by the application itself.
pub const CODESPACE: &str = "app";

#[derive(Debug, Error)]
pub enum StakeError {
    #[error("invalid bond {0}")]
    InvalidBond(String),

    #[error("bond must be in {expected}, got {found}")]
    WrongDenom { expected: String, found: String },

    #[error("{0} has nothing bonded")]
    NotBonded(Address),

    #[error("voting power of {0} would overflow")]
    PowerOverflow(Address),

    #[error("bank error: {0}")]
    Bank(#[from] BankError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl StakeError {
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidBond(_) => 1,
            Self::WrongDenom { .. } => 2,
            Self::NotBonded(_) => 3,
            Self::PowerOverflow(_) => 4,
            Self::Bank(_) => 5,
            Self::Store(_) => 6,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid message: {0}")]
    InvalidMsg(String),

    #[error("block height {got} does not follow {last}")]
    InvalidHeight { last: BlockHeight, got: BlockHeight },

    #[error("no block in progress")]
    NoBlockInProgress,

    #[error("a block is already in progress at height {0}")]
    BlockInProgress(BlockHeight),

    #[error("chain already initialised at height {0}")]
    AlreadyInitialized(BlockHeight),

    #[error("governance error: {0}")]
    Governance(#[from] GovernanceError),

    #[error("bank error: {0}")]
    Bank(#[from] BankError),

    #[error("stake error: {0}")]
    Stake(#[from] StakeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] LmdbError),

    #[error("invalid genesis: {0}")]
    Genesis(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Codespace the error's [`code`](Self::code) belongs to.
    pub fn codespace(&self) -> &'static str {
        match self {
            Self::Governance(_) => simplegov_governance::error::CODESPACE,
            Self::Bank(_) => "bank",
            Self::Stake(_) => "stake",
            _ => CODESPACE,
        }
    }

    /// Stable code reported in a transaction result. Never zero.
    pub fn code(&self) -> u32 {
        match self {
            Self::Governance(e) => e.code(),
            Self::Bank(e) => bank_code(e),
            Self::Stake(e) => e.code(),
            Self::Unauthorized(_) => 1,
            Self::InvalidMsg(_) => 2,
            Self::InvalidHeight { .. } => 3,
            Self::NoBlockInProgress => 4,
            Self::BlockInProgress(_) => 5,
            Self::AlreadyInitialized(_) => 6,
            Self::Store(_) => 7,
            Self::Lmdb(_) => 8,
            Self::Genesis(_) => 9,
            Self::Config(_) => 10,
            Self::Io(_) => 11,
            Self::Json(_) => 12,
        }
    }

    /// Errors after which the node must stop instead of carrying on with the
    /// next transaction or block.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Governance(e) => e.is_fatal(),
            Self::Bank(BankError::Store(_)) | Self::Stake(StakeError::Store(_)) => true,
            Self::Store(_) | Self::Lmdb(_) | Self::Io(_) => true,
            _ => false,
        }
    }
}

fn bank_code(e: &BankError) -> u32 {
    match e {
        BankError::InsufficientFunds { .. } => 1,
        BankError::InvalidCoins(_) => 2,
        BankError::AccountBlocked(_) => 3,
        BankError::Store(_) => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplegov_types::ProposalId;

    #[test]
    fn codes_are_namespaced() {
        let gov = AppError::from(GovernanceError::VotingClosed(ProposalId::new(1)));
        assert_eq!((gov.codespace(), gov.code()), ("gov", 9));

        let auth = AppError::Unauthorized("x".into());
        assert_eq!((auth.codespace(), auth.code()), ("app", 1));

        let stake = AppError::from(StakeError::NotBonded(Address::new("a")));
        assert_eq!((stake.codespace(), stake.code()), ("stake", 3));
    }

    #[test]
    fn store_failures_are_fatal() {
        assert!(AppError::from(StoreError::Backend("disk".into())).is_fatal());
        assert!(!AppError::InvalidMsg("x".into()).is_fatal());
        assert!(AppError::from(GovernanceError::Disposition {
            id: ProposalId::new(1),
            reason: "x".into()
        })
        .is_fatal());
    }
}
