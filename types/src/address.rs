//! Account address type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An account address as delivered by the host's authentication layer.
///
/// The address is opaque to this ledger: the only structural rule enforced
/// here is that a signer address must be non-empty (see [`Address::is_empty`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Prefix used for accounts owned by a module rather than a key holder.
    pub const MODULE_PREFIX: &'static str = "module/";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The account owned by the module `name` (e.g. the governance escrow).
    pub fn module(name: &str) -> Self {
        Self(format!("{}{}", Self::MODULE_PREFIX, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this address belongs to a module account.
    pub fn is_module(&self) -> bool {
        self.0.starts_with(Self::MODULE_PREFIX)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_accounts_are_prefixed() {
        let escrow = Address::module("gov");
        assert_eq!(escrow.as_str(), "module/gov");
        assert!(escrow.is_module());
        assert!(!Address::new("alice").is_module());
    }

    #[test]
    fn default_address_is_empty() {
        assert!(Address::default().is_empty());
        assert!(!Address::from("alice").is_empty());
    }
}
