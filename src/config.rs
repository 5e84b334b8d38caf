//! Provider configuration
//!
//! Selects the feed variant, base currency and reference time zone of a rate
//! provider. Deserializable from TOML, with defaults for the ECB feeds.

use crate::calendar::{DayClock, DEFAULT_TIMEZONE};
use crate::currency::CurrencyCode;
use crate::data::fx::FeedFormat;
use crate::error::{RatesError, Result};
use serde::{Deserialize, Serialize};

/// Which series of the feed a provider serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedVariant {
    /// Latest published day only
    #[default]
    Current,
    /// Last 90 days
    Historic90,
    /// Full history since 1999
    Historic,
}

impl FeedVariant {
    /// Id the feed loader delivers this variant under
    pub fn data_id(&self) -> &'static str {
        match self {
            FeedVariant::Current => "ECBCurrent",
            FeedVariant::Historic90 => "ECBHist90",
            FeedVariant::Historic => "ECBHist",
        }
    }

    /// Provider identity reported on resolved rates
    pub fn provider_name(&self) -> &'static str {
        match self {
            FeedVariant::Current => "ECB",
            FeedVariant::Historic90 => "ECB-HIST90",
            FeedVariant::Historic => "ECB-HIST",
        }
    }
}

/// Configuration of a rate provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_currency")]
    pub base_currency: CurrencyCode,
    #[serde(default)]
    pub variant: FeedVariant,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub feed_format: FeedFormat,
}

fn default_base_currency() -> CurrencyCode {
    CurrencyCode::EUR
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.name().to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            variant: FeedVariant::default(),
            timezone: default_timezone(),
            feed_format: FeedFormat::default(),
        }
    }
}

impl ProviderConfig {
    /// Default configuration for a feed variant
    pub fn for_variant(variant: FeedVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Day clock of the configured time zone
    pub fn clock(&self) -> Result<DayClock> {
        DayClock::from_name(&self.timezone)
    }

    /// Check the configuration before a provider is built from it
    ///
    /// Currency codes are already well formed once deserialized. The ECB wide
    /// files are always quoted against EUR, so any other base is rejected there.
    pub fn validate(&self) -> Result<()> {
        self.clock()?;
        if self.feed_format == FeedFormat::EcbWide && self.base_currency != CurrencyCode::EUR {
            return Err(RatesError::ConfigError(format!(
                "ECB feeds are quoted against EUR, not {}",
                self.base_currency
            )));
        }
        Ok(())
    }
}
