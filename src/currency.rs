//! Currency codes and currency pairs

use crate::error::{RatesError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// ISO 4217 alphabetic currency code (e.g. `EUR`, `USD`)
///
/// Stored inline as three upper-case ASCII letters, so it is `Copy` and cheap
/// to hash. Feeds may carry codes that are not in any fixed list (ECB has
/// published rates for currencies that no longer exist), so any three letters
/// are accepted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// Euro, the base currency of the ECB reference rate feed
    pub const EUR: CurrencyCode = CurrencyCode(*b"EUR");
    /// US Dollar
    pub const USD: CurrencyCode = CurrencyCode(*b"USD");

    /// Parse and normalize a currency code
    pub fn new(code: &str) -> Result<Self> {
        let trimmed = code.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(RatesError::InvalidCurrency(code.to_string()));
        }
        let mut buf = [0u8; 3];
        for (dst, src) in buf.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Self(buf))
    }

    /// Get currency code as string
    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for CurrencyCode {
    type Err = RatesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyCode({})", self.as_str())
    }
}

impl Serialize for CurrencyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CurrencyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CurrencyCode::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Currency pair for exchange rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: CurrencyCode,
    pub term: CurrencyCode,
}

impl CurrencyPair {
    /// Create new currency pair
    pub fn new(base: CurrencyCode, term: CurrencyCode) -> Self {
        Self { base, term }
    }

    /// Get the inverse pair
    pub fn inverse(&self) -> Self {
        Self {
            base: self.term,
            term: self.base,
        }
    }

    /// Parse from string (e.g., "EUR/USD" or "EURUSD")
    pub fn from_string(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((base, term)) = s.split_once('/') {
            Ok(Self::new(base.parse()?, term.parse()?))
        } else if s.len() == 6 && s.is_ascii() {
            Ok(Self::new(s[0..3].parse()?, s[3..6].parse()?))
        } else {
            Err(RatesError::InvalidCurrency(format!(
                "Invalid currency pair format: {}",
                s
            )))
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.term)
    }
}
