//! Nullable stake table.

use simplegov_governance::StakeKeeper;
use simplegov_store::StoreError;
use simplegov_types::Address;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Voting power set directly by the test.
#[derive(Default)]
pub struct NullStake {
    power: Mutex<BTreeMap<Address, u64>>,
}

impl NullStake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_power(self, address: impl Into<Address>, power: u64) -> Self {
        self.set_power(&address.into(), power);
        self
    }

    pub fn set_power(&self, address: &Address, power: u64) {
        self.power.lock().unwrap().insert(address.clone(), power);
    }
}

impl StakeKeeper for NullStake {
    fn voting_power_of(&self, address: &Address) -> Result<u64, StoreError> {
        Ok(self.power.lock().unwrap().get(address).copied().unwrap_or(0))
    }
}
