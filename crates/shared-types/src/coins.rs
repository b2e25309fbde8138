//! # Coins
//!
//! Multi-denomination amounts. A `Coins` value is always sorted by denom,
//! holds at most one entry per denom and never holds a zero amount.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoinsError;

/// A single denomination amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination, e.g. `stake`.
    pub denom: String,
    /// Amount in base units.
    pub amount: u128,
}

impl Coin {
    /// Create a coin.
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// True when the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = CoinsError;

    /// Parses `<amount><denom>`, e.g. `1000stake`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| CoinsError::Parse(s.to_string()))?;
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() || !is_valid_denom(denom) {
            return Err(CoinsError::Parse(s.to_string()));
        }
        let amount = amount
            .parse::<u128>()
            .map_err(|_| CoinsError::Parse(s.to_string()))?;
        Ok(Coin::new(denom, amount))
    }
}

fn is_valid_denom(denom: &str) -> bool {
    let mut chars = denom.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && denom.len() >= 2
        && denom.len() <= 128
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'))
}

/// Sorted set of coins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Empty coin set.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a normalized set: duplicates are summed and zero amounts dropped.
    pub fn new(coins: impl IntoIterator<Item = Coin>) -> Result<Self, CoinsError> {
        let mut by_denom: BTreeMap<String, u128> = BTreeMap::new();
        for coin in coins {
            if !is_valid_denom(&coin.denom) {
                return Err(CoinsError::InvalidDenom(coin.denom));
            }
            let entry = by_denom.entry(coin.denom).or_default();
            *entry = entry.checked_add(coin.amount).ok_or(CoinsError::Overflow)?;
        }
        Ok(Self::from_sorted_map(by_denom))
    }

    /// Single-coin set. A zero amount yields the empty set.
    pub fn single(denom: impl Into<String>, amount: u128) -> Self {
        let coin = Coin::new(denom, amount);
        if coin.is_zero() {
            Self::empty()
        } else {
            Self(vec![coin])
        }
    }

    fn from_sorted_map(map: BTreeMap<String, u128>) -> Self {
        Self(
            map.into_iter()
                .filter(|(_, amount)| *amount > 0)
                .map(|(denom, amount)| Coin { denom, amount })
                .collect(),
        )
    }

    fn to_map(&self) -> BTreeMap<String, u128> {
        self.0.iter().map(|c| (c.denom.clone(), c.amount)).collect()
    }

    /// Amount held of `denom`, zero when absent.
    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or(0)
    }

    /// True when the set holds nothing.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of denominations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no denominations are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate coins in denom order.
    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    /// Sum of two sets.
    pub fn checked_add(&self, other: &Coins) -> Result<Coins, CoinsError> {
        let mut map = self.to_map();
        for coin in &other.0 {
            let entry = map.entry(coin.denom.clone()).or_default();
            *entry = entry.checked_add(coin.amount).ok_or(CoinsError::Overflow)?;
        }
        Ok(Self::from_sorted_map(map))
    }

    /// Difference of two sets; fails if any denom would go negative.
    pub fn checked_sub(&self, other: &Coins) -> Result<Coins, CoinsError> {
        let mut map = self.to_map();
        for coin in &other.0 {
            let available = map.get(&coin.denom).copied().unwrap_or(0);
            if available < coin.amount {
                return Err(CoinsError::Insufficient {
                    denom: coin.denom.clone(),
                    available,
                    required: coin.amount,
                });
            }
            map.insert(coin.denom.clone(), available - coin.amount);
        }
        Ok(Self::from_sorted_map(map))
    }

    /// True when every denom in `other` is covered by `self`.
    pub fn is_all_gte(&self, other: &Coins) -> bool {
        other.iter().all(|c| self.amount_of(&c.denom) >= c.amount)
    }

    /// Scale every amount by `numerator / denominator`, rounding down.
    /// A zero denominator scales to nothing.
    pub fn mul_ratio_floor(&self, numerator: u128, denominator: u128) -> Result<Coins, CoinsError> {
        if denominator == 0 {
            return Ok(Coins::empty());
        }
        let map = self
            .0
            .iter()
            .map(|c| {
                let product = c.amount.checked_mul(numerator).ok_or(CoinsError::Overflow)?;
                Ok((c.denom.clone(), product / denominator))
            })
            .collect::<Result<BTreeMap<_, _>, CoinsError>>()?;
        Ok(Self::from_sorted_map(map))
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl FromStr for Coins {
    type Err = CoinsError;

    /// Parses a comma separated list, e.g. `10atom,1000stake`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Coins::empty());
        }
        let coins = s
            .split(',')
            .map(Coin::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Coins::new(coins)
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        Coins::single(coin.denom, coin.amount)
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
