//! Collaborator subsystems the governance keeper depends on.
//!
//! The host wires in its own bank and stake modules; tests use the in-memory
//! doubles from `simplegov-nullables`.

use simplegov_store::StoreError;
use simplegov_types::{Address, Coins};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("insufficient funds in {address}: need {needed}, have {available}")]
    InsufficientFunds {
        address: Address,
        needed: Coins,
        available: Coins,
    },

    #[error("invalid coins: {0}")]
    InvalidCoins(String),

    #[error("account {0} cannot receive funds")]
    AccountBlocked(Address),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Atomic debit/credit of coin balances.
pub trait CoinKeeper {
    /// Remove `amount` from `address`, failing without effect if the balance
    /// does not cover it.
    fn debit(&self, address: &Address, amount: &Coins) -> Result<(), BankError>;

    /// Add `amount` to `address`.
    fn credit(&self, address: &Address, amount: &Coins) -> Result<(), BankError>;

    fn balance(&self, address: &Address) -> Result<Coins, BankError>;
}

/// Source of voting power.
pub trait StakeKeeper {
    /// Voting power currently bonded by `address` (zero if none).
    fn voting_power_of(&self, address: &Address) -> Result<u64, StoreError>;
}

impl<T: CoinKeeper + ?Sized> CoinKeeper for &T {
    fn debit(&self, address: &Address, amount: &Coins) -> Result<(), BankError> {
        (**self).debit(address, amount)
    }

    fn credit(&self, address: &Address, amount: &Coins) -> Result<(), BankError> {
        (**self).credit(address, amount)
    }

    fn balance(&self, address: &Address) -> Result<Coins, BankError> {
        (**self).balance(address)
    }
}

impl<T: StakeKeeper + ?Sized> StakeKeeper for &T {
    fn voting_power_of(&self, address: &Address) -> Result<u64, StoreError> {
        (**self).voting_power_of(address)
    }
}
