//! Application genesis: accounts, stake table and governance state.

use serde::{Deserialize, Serialize};
use simplegov_governance::{GenesisState, MODULE_NAME as GOV_MODULE};
use simplegov_types::{Address, Coins};
use std::collections::BTreeSet;
use std::path::Path;

use crate::stake::{StakeParams, MODULE_NAME as STAKE_MODULE};
use crate::AppError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub address: Address,
    pub coins: Coins,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisStake {
    pub address: Address,
    pub power: u64,
    #[serde(default)]
    pub bonded: Coins,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeGenesis {
    #[serde(default)]
    pub params: StakeParams,
    #[serde(default)]
    pub stakes: Vec<GenesisStake>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppGenesis {
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,
    #[serde(default)]
    pub stake: StakeGenesis,
    #[serde(default)]
    pub gov: GenesisState,
}

impl AppGenesis {
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural checks on the bank and stake sections, and escrow coverage:
    /// the gov module account must hold every open deposit and the stake
    /// module account every bonded coin. Governance state itself is checked
    /// by the governance module on import.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut seen = BTreeSet::new();
        for account in &self.accounts {
            if account.address.is_empty() || !seen.insert(&account.address) {
                return Err(AppError::Genesis(format!(
                    "empty or duplicate account {:?}",
                    account.address.as_str()
                )));
            }
            if !account.coins.is_valid() || account.coins.iter().any(|c| !c.is_positive()) {
                return Err(AppError::Genesis(format!(
                    "account {} holds invalid coins {:?}",
                    account.address, account.coins
                )));
            }
        }

        let mut stakers = BTreeSet::new();
        for stake in &self.stake.stakes {
            if stake.address.is_empty() || !stakers.insert(&stake.address) {
                return Err(AppError::Genesis(format!(
                    "empty or duplicate staker {:?}",
                    stake.address.as_str()
                )));
            }
            if !stake.bonded.is_valid() {
                return Err(AppError::Genesis(format!(
                    "staker {} has invalid bonded coins",
                    stake.address
                )));
            }
        }

        let open_deposits = self
            .gov
            .open_deposits()
            .ok_or_else(|| AppError::Genesis("open proposal deposits overflow".into()))?;
        self.check_escrow(&Address::module(GOV_MODULE), &open_deposits, "open proposal deposits")?;

        let bonded = self
            .stake
            .stakes
            .iter()
            .try_fold(Coins::empty(), |acc, stake| acc.checked_add(&stake.bonded))
            .ok_or_else(|| AppError::Genesis("bonded stake overflows".into()))?;
        self.check_escrow(&Address::module(STAKE_MODULE), &bonded, "bonded stake")?;
        Ok(())
    }

    fn balance_of(&self, address: &Address) -> Coins {
        self.accounts
            .iter()
            .find(|account| &account.address == address)
            .map(|account| account.coins.clone())
            .unwrap_or_default()
    }

    fn check_escrow(&self, escrow: &Address, owed: &Coins, what: &str) -> Result<(), AppError> {
        let held = self.balance_of(escrow);
        if !held.is_all_gte(owed) {
            return Err(AppError::Genesis(format!(
                "{escrow} holds {held} but {what} total {owed}"
            )));
        }
        Ok(())
    }
}
