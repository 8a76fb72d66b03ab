//! Coin amounts recorded as pool swap fees.
//!
//! Text form follows the Cosmos SDK: `{amount}{denom}` for a single coin,
//! comma-separated and sorted by denomination for a coin list.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ValidationError;

/// A single amount of one denomination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Result<Self, ValidationError> {
        let denom = denom.into();
        validate_denom(&denom)?;
        Ok(Self { denom, amount })
    }

    /// Build a coin from a decimal amount string and a denomination.
    pub fn from_parts(amount: &str, denom: &str) -> Result<Self, ValidationError> {
        Coin::new(denom, parse_amount(amount)?)
    }

    /// Parse the `{amount}{denom}` form, e.g. `100uatom`.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ValidationError::InvalidCoin(s.to_string()))?;
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() {
            return Err(ValidationError::InvalidCoin(s.to_string()));
        }
        Coin::from_parts(amount, denom.trim())
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

fn parse_amount(amount: &str) -> Result<u128, ValidationError> {
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidAmount(amount.to_string()));
    }
    amount
        .parse::<u128>()
        .map_err(|_| ValidationError::InvalidAmount(amount.to_string()))
}

/// Denominations: a letter, then 2 to 127 of `[a-zA-Z0-9/:._-]`.
fn validate_denom(denom: &str) -> Result<(), ValidationError> {
    let mut chars = denom.chars();
    let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'));
    if first_ok && rest_ok && (3..=128).contains(&denom.len()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidDenom(denom.to_string()))
    }
}

/// A set of coins summed per denomination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coins(BTreeMap<String, u128>);

impl Coins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coin, summing with any amount already held for its denomination.
    /// Zero amounts are dropped.
    pub fn add(&mut self, coin: Coin) -> Result<(), ValidationError> {
        if coin.amount == 0 {
            return Ok(());
        }
        let slot = self.0.entry(coin.denom.clone()).or_insert(0);
        *slot = slot
            .checked_add(coin.amount)
            .ok_or(ValidationError::AmountOverflow(coin.denom))?;
        Ok(())
    }

    /// Add every coin of `other`.
    pub fn merge(&mut self, other: Coins) -> Result<(), ValidationError> {
        for coin in other {
            self.add(coin)?;
        }
        Ok(())
    }

    /// Amount held for `denom`, zero when absent.
    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0.get(denom).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Coins in denomination order.
    pub fn iter(&self) -> impl Iterator<Item = Coin> + '_ {
        self.0.iter().map(|(denom, amount)| Coin {
            denom: denom.clone(),
            amount: *amount,
        })
    }

    /// Parse a comma-separated coin list. The empty string is an empty list.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let mut coins = Coins::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            coins.add(Coin::parse(part)?)?;
        }
        Ok(coins)
    }
}

impl IntoIterator for Coins {
    type Item = Coin;
    type IntoIter = std::iter::Map<std::collections::btree_map::IntoIter<String, u128>, fn((String, u128)) -> Coin>;

    fn into_iter(self) -> Self::IntoIter {
        let to_coin: fn((String, u128)) -> Coin = |(denom, amount)| Coin { denom, amount };
        self.0.into_iter().map(to_coin)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (denom, amount) in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}{}", amount, denom)?;
            first = false;
        }
        Ok(())
    }
}
