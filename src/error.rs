//! Error types for rusty_rates

use crate::calendar::DayKey;
use crate::currency::CurrencyCode;
use thiserror::Error;

/// Main error type for rusty_rates
#[derive(Error, Debug)]
pub enum RatesError {
    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Cannot convert {base} to {term} on day {day}: no rate path through the feed base")]
    ConversionImpossible {
        base: CurrencyCode,
        term: CurrencyCode,
        day: DayKey,
    },

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Decimal overflow: {0}")]
    Overflow(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl RatesError {
    /// True for errors that mean "this pair cannot be converted", as opposed
    /// to bad input or a broken feed.
    pub fn is_conversion_impossible(&self) -> bool {
        matches!(self, RatesError::ConversionImpossible { .. })
    }
}

/// Result type alias for rusty_rates operations
pub type Result<T> = std::result::Result<T, RatesError>;
