//! Bonded stake and the voting power derived from it.
//!
//! Bonding moves coins of the bond denomination into the stake module
//! account and adds their amount to the bonder's voting power; unbonding
//! returns everything and drops the power to zero. Power granted at genesis
//! may have no bonded coins behind it.

use serde::{Deserialize, Serialize};
use simplegov_governance::{CoinKeeper, StakeKeeper};
use simplegov_store::{decode, encode, KvStore, StoreError};
use simplegov_types::{Address, Coins};

use crate::error::StakeError;

const PARAMS_KEY: &[u8] = b"params";
const POWER_PREFIX: &[u8] = b"power/";

/// Name of the module account holding bonded coins.
pub const MODULE_NAME: &str = "stake";

fn power_key(address: &Address) -> Vec<u8> {
    let mut key = POWER_PREFIX.to_vec();
    key.extend_from_slice(address.as_bytes());
    key
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeParams {
    #[serde(default = "default_bond_denom")]
    pub bond_denom: String,
}

fn default_bond_denom() -> String {
    "coin".to_string()
}

impl Default for StakeParams {
    fn default() -> Self {
        Self {
            bond_denom: default_bond_denom(),
        }
    }
}

/// Stake held by one address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    pub power: u64,
    #[serde(default)]
    pub bonded: Coins,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondMsg {
    pub address: Address,
    pub amount: Coins,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondMsg {
    pub address: Address,
}

impl BondMsg {
    pub fn validate_basic(&self) -> Result<(), StakeError> {
        if self.address.is_empty() {
            return Err(StakeError::InvalidBond("bonder must be set".into()));
        }
        if !self.amount.is_valid() || !self.amount.is_positive() || self.amount.as_slice().len() != 1 {
            return Err(StakeError::InvalidBond(format!(
                "{:?} is not a single positive coin",
                self.amount
            )));
        }
        Ok(())
    }
}

impl UnbondMsg {
    pub fn validate_basic(&self) -> Result<(), StakeError> {
        if self.address.is_empty() {
            return Err(StakeError::InvalidBond("unbonder must be set".into()));
        }
        Ok(())
    }
}

/// Stake table kept in the stake namespace of the store.
pub struct KvStake<S> {
    store: S,
}

impl<S: KvStore> KvStake<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn escrow_address() -> Address {
        Address::module(MODULE_NAME)
    }

    pub fn params(&self) -> Result<StakeParams, StoreError> {
        match self.store.get(PARAMS_KEY)? {
            Some(bytes) => decode(&bytes),
            None => Ok(StakeParams::default()),
        }
    }

    pub fn set_params(&self, params: &StakeParams) -> Result<(), StoreError> {
        self.store.put(PARAMS_KEY, &encode(params)?)
    }

    pub fn record(&self, address: &Address) -> Result<Option<StakeRecord>, StoreError> {
        self.store
            .get(&power_key(address))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    pub fn set_record(&self, address: &Address, record: &StakeRecord) -> Result<(), StoreError> {
        if *record == StakeRecord::default() {
            self.store.delete(&power_key(address))
        } else {
            self.store.put(&power_key(address), &encode(record)?)
        }
    }

    /// Every staker, ordered by address bytes.
    pub fn records(&self) -> Result<Vec<(Address, StakeRecord)>, StoreError> {
        let mut records = Vec::new();
        for (key, bytes) in self.store.iter_prefix(POWER_PREFIX)? {
            let raw = String::from_utf8(key[POWER_PREFIX.len()..].to_vec()).map_err(|_| {
                StoreError::Corruption(format!("non-utf8 stake key {}", hex::encode(&key)))
            })?;
            records.push((Address::new(raw), decode(&bytes)?));
        }
        Ok(records)
    }

    pub fn bond<C: CoinKeeper>(&self, coins: &C, msg: &BondMsg) -> Result<u64, StakeError> {
        msg.validate_basic()?;
        let params = self.params()?;
        let coin = &msg.amount.as_slice()[0];
        if coin.denom != params.bond_denom {
            return Err(StakeError::WrongDenom {
                expected: params.bond_denom,
                found: coin.denom.clone(),
            });
        }
        let added = u64::try_from(coin.amount)
            .map_err(|_| StakeError::PowerOverflow(msg.address.clone()))?;

        let mut record = self.record(&msg.address)?.unwrap_or_default();
        record.power = record
            .power
            .checked_add(added)
            .ok_or_else(|| StakeError::PowerOverflow(msg.address.clone()))?;
        record.bonded = record
            .bonded
            .checked_add(&msg.amount)
            .ok_or_else(|| StakeError::PowerOverflow(msg.address.clone()))?;

        coins.debit(&msg.address, &msg.amount)?;
        coins.credit(&Self::escrow_address(), &msg.amount)?;
        self.set_record(&msg.address, &record)?;

        tracing::debug!(address = %msg.address, amount = %msg.amount, power = record.power, "stake bonded");
        Ok(record.power)
    }

    /// Release everything `msg.address` has bonded. Returns the coins handed back.
    pub fn unbond<C: CoinKeeper>(&self, coins: &C, msg: &UnbondMsg) -> Result<Coins, StakeError> {
        msg.validate_basic()?;
        let record = self
            .record(&msg.address)?
            .ok_or_else(|| StakeError::NotBonded(msg.address.clone()))?;

        if !record.bonded.is_empty() {
            coins.debit(&Self::escrow_address(), &record.bonded)?;
            coins.credit(&msg.address, &record.bonded)?;
        }
        self.set_record(&msg.address, &StakeRecord::default())?;

        tracing::debug!(address = %msg.address, returned = %record.bonded, "stake unbonded");
        Ok(record.bonded)
    }
}

impl<S: KvStore> StakeKeeper for KvStake<S> {
    fn voting_power_of(&self, address: &Address) -> Result<u64, StoreError> {
        Ok(self.record(address)?.map(|r| r.power).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplegov_nullables::{NullBank, NullKvStore};

    #[test]
    fn bond_then_unbond_restores_balance() {
        let store = NullKvStore::new();
        let stake = KvStake::new(&store);
        let bank = NullBank::new().with_balance("alice", Coins::single("coin", 100));
        let alice = Address::new("alice");

        let power = stake
            .bond(&bank, &BondMsg { address: alice.clone(), amount: Coins::single("coin", 60) })
            .unwrap();
        assert_eq!(power, 60);
        assert_eq!(stake.voting_power_of(&alice).unwrap(), 60);
        assert_eq!(bank.amount_of(&alice, "coin"), 40);
        assert_eq!(bank.amount_of(&KvStake::<&NullKvStore>::escrow_address(), "coin"), 60);

        let returned = stake.unbond(&bank, &UnbondMsg { address: alice.clone() }).unwrap();
        assert_eq!(returned, Coins::single("coin", 60));
        assert_eq!(stake.voting_power_of(&alice).unwrap(), 0);
        assert_eq!(bank.amount_of(&alice, "coin"), 100);
        assert!(store.is_empty());
    }

    #[test]
    fn bond_requires_the_bond_denom() {
        let store = NullKvStore::new();
        let stake = KvStake::new(&store);
        let bank = NullBank::new().with_balance("alice", Coins::single("atom", 100));
        let err = stake
            .bond(&bank, &BondMsg { address: Address::new("alice"), amount: Coins::single("atom", 1) })
            .unwrap_err();
        assert!(matches!(err, StakeError::WrongDenom { .. }));
    }

    #[test]
    fn unbond_without_stake_fails() {
        let store = NullKvStore::new();
        let stake = KvStake::new(&store);
        let err = stake
            .unbond(&NullBank::new(), &UnbondMsg { address: Address::new("bob") })
            .unwrap_err();
        assert!(matches!(err, StakeError::NotBonded(_)));
    }

    #[test]
    fn genesis_power_needs_no_bonded_coins() {
        let store = NullKvStore::new();
        let stake = KvStake::new(&store);
        let bob = Address::new("bob");
        stake
            .set_record(&bob, &StakeRecord { power: 30, bonded: Coins::empty() })
            .unwrap();
        assert_eq!(stake.voting_power_of(&bob).unwrap(), 30);
        assert_eq!(stake.unbond(&NullBank::new(), &UnbondMsg { address: bob.clone() }).unwrap(), Coins::empty());
        assert_eq!(stake.voting_power_of(&bob).unwrap(), 0);
    }
}
