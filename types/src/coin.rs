//! Multi-denomination coin amounts.
//!
//! Amounts are signed 128-bit integers so that malformed wire input (a
//! negative deposit, say) stays representable and can be rejected by
//! validation instead of failing to decode. Balances held by the ledger are
//! never negative: [`Coins::checked_sub`] refuses to go below zero.

use crate::error::CoinError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Minimum and maximum length of a denomination.
const DENOM_MIN_LEN: usize = 3;
const DENOM_MAX_LEN: usize = 16;

/// A single amount of one denomination, e.g. `100coin`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: i128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: i128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Denominations are 3-16 characters: a lowercase letter followed by
    /// lowercase letters or digits.
    pub fn is_valid_denom(denom: &str) -> bool {
        let len = denom.len();
        if !(DENOM_MIN_LEN..=DENOM_MAX_LEN).contains(&len) {
            return false;
        }
        let mut chars = denom.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits_start = usize::from(s.starts_with('-'));
        let split = s[digits_start..]
            .find(|c: char| !c.is_ascii_digit())
            .map(|i| i + digits_start)
            .ok_or_else(|| CoinError::InvalidFormat(s.to_string()))?;
        let (amount, denom) = s.split_at(split);
        if amount.len() == digits_start {
            return Err(CoinError::InvalidFormat(s.to_string()));
        }
        let amount = amount
            .parse::<i128>()
            .map_err(|_| CoinError::InvalidFormat(s.to_string()))?;
        if !Coin::is_valid_denom(denom) {
            return Err(CoinError::InvalidDenom(denom.to_string()));
        }
        Ok(Coin::new(denom, amount))
    }
}

/// A set of coins of distinct denominations.
///
/// A well-formed set ([`Coins::is_valid`]) is sorted by denomination with no
/// duplicates and no zero amounts. Arithmetic results are always well-formed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Wrap a list of coins as given; use [`Coins::is_valid`] to check it.
    pub fn new(coins: Vec<Coin>) -> Self {
        Self(coins)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn single(denom: impl Into<String>, amount: i128) -> Self {
        Self(vec![Coin::new(denom, amount)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Coin] {
        &self.0
    }

    /// Amount held of `denom` (zero if absent).
    pub fn amount_of(&self, denom: &str) -> i128 {
        self.0
            .iter()
            .filter(|c| c.denom == denom)
            .map(|c| c.amount)
            .sum()
    }

    /// Sorted, unique, valid denominations and no zero amounts.
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|c| Coin::is_valid_denom(&c.denom) && c.amount != 0)
            && self.0.windows(2).all(|w| w[0].denom < w[1].denom)
    }

    /// Non-empty and every amount strictly positive.
    pub fn is_positive(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(Coin::is_positive)
    }

    /// Whether `self` holds at least `other` of every denomination in `other`.
    pub fn is_all_gte(&self, other: &Coins) -> bool {
        other.iter().all(|c| self.amount_of(&c.denom) >= c.amount)
    }

    /// Sum of two coin sets. `None` on overflow.
    pub fn checked_add(&self, other: &Coins) -> Option<Coins> {
        let mut acc = self.to_map()?;
        for coin in other.iter() {
            let slot = acc.entry(coin.denom.clone()).or_insert(0);
            *slot = slot.checked_add(coin.amount)?;
        }
        Some(Self::from_map(acc))
    }

    /// Difference of two coin sets. `None` if any denomination would go
    /// negative.
    pub fn checked_sub(&self, other: &Coins) -> Option<Coins> {
        let mut acc = self.to_map()?;
        for coin in other.iter() {
            let slot = acc.entry(coin.denom.clone()).or_insert(0);
            *slot = slot.checked_sub(coin.amount)?;
            if *slot < 0 {
                return None;
            }
        }
        Some(Self::from_map(acc))
    }

    fn to_map(&self) -> Option<BTreeMap<String, i128>> {
        let mut map = BTreeMap::new();
        for coin in &self.0 {
            let slot = map.entry(coin.denom.clone()).or_insert(0i128);
            *slot = slot.checked_add(coin.amount)?;
        }
        Some(map)
    }

    fn from_map(map: BTreeMap<String, i128>) -> Self {
        Self(
            map.into_iter()
                .filter(|(_, amount)| *amount != 0)
                .map(|(denom, amount)| Coin { denom, amount })
                .collect(),
        )
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", coin)?;
        }
        Ok(())
    }
}

impl FromStr for Coins {
    type Err = CoinError;

    /// Parse `"100coin,5atom"`. The result is sorted by denomination;
    /// duplicate denominations are kept so that validation can reject them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::empty());
        }
        let mut coins = s
            .split(',')
            .map(Coin::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        Ok(Self(coins))
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        Self(vec![coin])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_and_multi_denom() {
        let c: Coin = "100coin".parse().unwrap();
        assert_eq!(c, Coin::new("coin", 100));

        let cs: Coins = "5stake, 100coin".parse().unwrap();
        assert_eq!(cs.to_string(), "100coin,5stake");
        assert!(cs.is_valid());
        assert!(cs.is_positive());
    }

    #[test]
    fn parses_negative_amounts_for_later_rejection() {
        let cs: Coins = "-5coin".parse().unwrap();
        assert!(cs.is_valid());
        assert!(!cs.is_positive());
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert!(matches!("coin".parse::<Coin>(), Err(CoinError::InvalidFormat(_))));
        assert!(matches!("100".parse::<Coin>(), Err(CoinError::InvalidFormat(_))));
        assert!(matches!("-coin".parse::<Coin>(), Err(CoinError::InvalidFormat(_))));
        assert!(matches!("10C".parse::<Coin>(), Err(CoinError::InvalidDenom(_))));
    }

    #[test]
    fn validity_requires_sorted_unique_nonzero() {
        let zero = Coins::new(vec![Coin::new("coin", 0)]);
        assert!(!zero.is_valid());

        let unsorted = Coins::new(vec![Coin::new("stake", 1), Coin::new("coin", 1)]);
        assert!(!unsorted.is_valid());

        let dup = Coins::new(vec![Coin::new("coin", 1), Coin::new("coin", 2)]);
        assert!(!dup.is_valid());

        assert!(Coins::empty().is_valid());
        assert!(!Coins::empty().is_positive());
    }

    #[test]
    fn sub_refuses_to_go_negative() {
        let balance = Coins::single("coin", 50);
        assert_eq!(balance.checked_sub(&Coins::single("coin", 80)), None);
        assert_eq!(balance.checked_sub(&Coins::single("atom", 1)), None);
        assert_eq!(
            balance.checked_sub(&Coins::single("coin", 50)),
            Some(Coins::empty())
        );
    }

    #[test]
    fn add_merges_denominations_in_order() {
        let a: Coins = "10coin".parse().unwrap();
        let b: Coins = "3atom,5coin".parse().unwrap();
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.to_string(), "3atom,15coin");
        assert!(sum.is_all_gte(&b));
        assert!(!b.is_all_gte(&sum));
    }

    #[test]
    fn add_detects_overflow() {
        let a = Coins::single("coin", i128::MAX);
        assert_eq!(a.checked_add(&Coins::single("coin", 1)), None);
    }
}
