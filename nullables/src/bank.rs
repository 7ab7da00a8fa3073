//! Nullable bank: in-memory coin balances for testing.

use simplegov_governance::{BankError, CoinKeeper};
use simplegov_types::{Address, Coins};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// In-memory [`CoinKeeper`] with controllable failures.
#[derive(Default)]
pub struct NullBank {
    balances: Mutex<BTreeMap<Address, Coins>>,
    blocked: Mutex<BTreeSet<Address>>,
}

impl NullBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style funding of `address`.
    pub fn with_balance(self, address: impl Into<Address>, coins: Coins) -> Self {
        self.set_balance(&address.into(), coins);
        self
    }

    pub fn set_balance(&self, address: &Address, coins: Coins) {
        self.balances
            .lock()
            .unwrap()
            .insert(address.clone(), coins);
    }

    /// Make every credit to `address` fail.
    pub fn block(&self, address: &Address) {
        self.blocked.lock().unwrap().insert(address.clone());
    }

    pub fn unblock(&self, address: &Address) {
        self.blocked.lock().unwrap().remove(address);
    }

    /// Amount of `denom` held by `address`.
    pub fn amount_of(&self, address: &Address, denom: &str) -> i128 {
        self.balances
            .lock()
            .unwrap()
            .get(address)
            .map(|coins| coins.amount_of(denom))
            .unwrap_or(0)
    }

    /// Sum of `denom` across every account.
    pub fn supply_of(&self, denom: &str) -> i128 {
        self.balances
            .lock()
            .unwrap()
            .values()
            .map(|coins| coins.amount_of(denom))
            .sum()
    }
}

impl CoinKeeper for NullBank {
    fn debit(&self, address: &Address, amount: &Coins) -> Result<(), BankError> {
        if !amount.is_valid() {
            return Err(BankError::InvalidCoins(amount.to_string()));
        }
        let mut balances = self.balances.lock().unwrap();
        let available = balances.get(address).cloned().unwrap_or_default();
        let remaining =
            available
                .checked_sub(amount)
                .ok_or_else(|| BankError::InsufficientFunds {
                    address: address.clone(),
                    needed: amount.clone(),
                    available: available.clone(),
                })?;
        balances.insert(address.clone(), remaining);
        Ok(())
    }

    fn credit(&self, address: &Address, amount: &Coins) -> Result<(), BankError> {
        if !amount.is_valid() {
            return Err(BankError::InvalidCoins(amount.to_string()));
        }
        if self.blocked.lock().unwrap().contains(address) {
            return Err(BankError::AccountBlocked(address.clone()));
        }
        let mut balances = self.balances.lock().unwrap();
        let current = balances.get(address).cloned().unwrap_or_default();
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| BankError::InvalidCoins(format!("balance overflow for {address}")))?;
        balances.insert(address.clone(), updated);
        Ok(())
    }

    fn balance(&self, address: &Address) -> Result<Coins, BankError> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}
