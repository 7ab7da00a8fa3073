//! Coin balances per address.

use serde::{Deserialize, Serialize};
use simplegov_governance::{BankError, CoinKeeper};
use simplegov_store::{decode, encode, KvStore, StoreError};
use simplegov_types::{Address, Coins};

const BALANCE_PREFIX: &[u8] = b"balance/";

fn balance_key(address: &Address) -> Vec<u8> {
    let mut key = BALANCE_PREFIX.to_vec();
    key.extend_from_slice(address.as_bytes());
    key
}

/// Move `amount` from one account to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMsg {
    pub from: Address,
    pub to: Address,
    pub amount: Coins,
}

impl SendMsg {
    pub fn validate_basic(&self) -> Result<(), BankError> {
        if self.from.is_empty() || self.to.is_empty() {
            return Err(BankError::InvalidCoins(
                "sender and recipient must be set".into(),
            ));
        }
        if !self.amount.is_valid() || !self.amount.is_positive() {
            return Err(BankError::InvalidCoins(format!(
                "send amount {:?} must be a positive coin amount",
                self.amount
            )));
        }
        Ok(())
    }

    pub fn signers(&self) -> Vec<Address> {
        vec![self.from.clone()]
    }
}

/// Balances kept in the bank namespace of the store.
pub struct KvBank<S> {
    store: S,
}

impl<S: KvStore> KvBank<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn set_balance(&self, address: &Address, coins: &Coins) -> Result<(), StoreError> {
        let key = balance_key(address);
        if coins.is_empty() {
            self.store.delete(&key)
        } else {
            self.store.put(&key, &encode(coins)?)
        }
    }

    pub fn send(&self, msg: &SendMsg) -> Result<(), BankError> {
        msg.validate_basic()?;
        self.debit(&msg.from, &msg.amount)?;
        self.credit(&msg.to, &msg.amount)?;
        tracing::debug!(from = %msg.from, to = %msg.to, amount = %msg.amount, "coins sent");
        Ok(())
    }

    /// Every non-empty account, ordered by address bytes.
    pub fn accounts(&self) -> Result<Vec<(Address, Coins)>, StoreError> {
        let mut accounts = Vec::new();
        for (key, bytes) in self.store.iter_prefix(BALANCE_PREFIX)? {
            let raw = String::from_utf8(key[BALANCE_PREFIX.len()..].to_vec()).map_err(|_| {
                StoreError::Corruption(format!("non-utf8 account key {}", hex::encode(&key)))
            })?;
            accounts.push((Address::new(raw), decode(&bytes)?));
        }
        Ok(accounts)
    }

    /// Sum of every balance.
    pub fn supply(&self) -> Result<Coins, BankError> {
        let mut total = Coins::empty();
        for (address, coins) in self.accounts()? {
            total = total.checked_add(&coins).ok_or_else(|| {
                BankError::InvalidCoins(format!("supply overflow at {address}"))
            })?;
        }
        Ok(total)
    }
}

impl<S: KvStore> CoinKeeper for KvBank<S> {
    fn debit(&self, address: &Address, amount: &Coins) -> Result<(), BankError> {
        if !amount.is_valid() {
            return Err(BankError::InvalidCoins(amount.to_string()));
        }
        let available = self.balance(address)?;
        let remaining =
            available
                .checked_sub(amount)
                .ok_or_else(|| BankError::InsufficientFunds {
                    address: address.clone(),
                    needed: amount.clone(),
                    available: available.clone(),
                })?;
        self.set_balance(address, &remaining)?;
        Ok(())
    }

    fn credit(&self, address: &Address, amount: &Coins) -> Result<(), BankError> {
        if !amount.is_valid() {
            return Err(BankError::InvalidCoins(amount.to_string()));
        }
        let updated = self
            .balance(address)?
            .checked_add(amount)
            .ok_or_else(|| BankError::InvalidCoins(format!("balance overflow for {address}")))?;
        self.set_balance(address, &updated)?;
        Ok(())
    }

    fn balance(&self, address: &Address) -> Result<Coins, BankError> {
        Ok(self
            .store
            .get(&balance_key(address))?
            .map(|bytes| decode(&bytes))
            .transpose()?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplegov_nullables::NullKvStore;

    fn coins(s: &str) -> Coins {
        s.parse().unwrap()
    }

    #[test]
    fn send_moves_coins_and_keeps_supply() {
        let store = NullKvStore::new();
        let bank = KvBank::new(&store);
        let alice = Address::new("alice");
        let bob = Address::new("bob");
        bank.set_balance(&alice, &coins("100coin,5atom")).unwrap();

        bank.send(&SendMsg {
            from: alice.clone(),
            to: bob.clone(),
            amount: coins("40coin,5atom"),
        })
        .unwrap();

        assert_eq!(bank.balance(&alice).unwrap(), coins("60coin"));
        assert_eq!(bank.balance(&bob).unwrap(), coins("40coin,5atom"));
        assert_eq!(bank.supply().unwrap(), coins("100coin,5atom"));
    }

    #[test]
    fn overdraft_is_rejected() {
        let store = NullKvStore::new();
        let bank = KvBank::new(&store);
        let alice = Address::new("alice");
        bank.set_balance(&alice, &coins("10coin")).unwrap();

        let err = bank.debit(&alice, &coins("11coin")).unwrap_err();
        assert!(matches!(err, BankError::InsufficientFunds { .. }));
        assert_eq!(bank.balance(&alice).unwrap(), coins("10coin"));
    }

    #[test]
    fn emptied_accounts_are_removed() {
        let store = NullKvStore::new();
        let bank = KvBank::new(&store);
        let alice = Address::new("alice");
        bank.set_balance(&alice, &coins("10coin")).unwrap();
        bank.debit(&alice, &coins("10coin")).unwrap();

        assert!(bank.accounts().unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_send_is_rejected() {
        let msg = SendMsg {
            from: Address::new("alice"),
            to: Address::default(),
            amount: coins("1coin"),
        };
        assert!(msg.validate_basic().is_err());

        let msg = SendMsg {
            from: Address::new("alice"),
            to: Address::new("bob"),
            amount: Coins::single("coin", 0),
        };
        assert!(msg.validate_basic().is_err());
    }
}
