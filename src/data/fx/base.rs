//! Base FX types - rate entries, resolved rates, queries and the RateProvider trait

use crate::calendar::DayKey;
use crate::currency::CurrencyCode;
use crate::error::{RatesError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One published rate: 1 unit of the feed base = `factor` units of `currency`
///
/// The factor keeps the scale it was published with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    pub currency: CurrencyCode,
    pub factor: Decimal,
}

impl RateEntry {
    pub fn new(currency: CurrencyCode, factor: Decimal) -> Self {
        Self { currency, factor }
    }
}

/// Kind of rate a provider serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateType {
    /// Rate belonging to a specific past day
    Historic,
    /// Delayed intraday rate
    Deferred,
    /// Live rate
    Realtime,
    /// Any of the above
    Any,
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RateType::Historic => "HISTORIC",
            RateType::Deferred => "DEFERRED",
            RateType::Realtime => "REALTIME",
            RateType::Any => "ANY",
        };
        f.write_str(s)
    }
}

/// Identity of a rate provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderContext {
    pub provider: String,
    pub rate_types: Vec<RateType>,
}

impl ProviderContext {
    pub fn new(provider: impl Into<String>, rate_types: Vec<RateType>) -> Self {
        Self {
            provider: provider.into(),
            rate_types,
        }
    }

    /// Context of a resolved rate on `day`, served by this provider
    pub fn historic(&self, day: DayKey) -> ConversionContext {
        ConversionContext {
            provider: self.provider.clone(),
            rate_type: RateType::Historic,
            day,
            timestamp: day.timestamp(),
        }
    }
}

/// Metadata attached to every resolved rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionContext {
    pub provider: String,
    pub rate_type: RateType,
    pub day: DayKey,
    pub timestamp: DateTime<Utc>,
}

/// An exchange rate answered by a provider
///
/// `chain` lists the legs a derived rate was composed from, in order.
/// It is empty for rates read directly from the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub base: CurrencyCode,
    pub term: CurrencyCode,
    pub factor: Decimal,
    pub context: ConversionContext,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<ResolvedRate>,
}

impl ResolvedRate {
    pub fn new(
        base: CurrencyCode,
        term: CurrencyCode,
        factor: Decimal,
        context: ConversionContext,
    ) -> Self {
        Self {
            base,
            term,
            factor,
            context,
            chain: Vec::new(),
        }
    }

    /// Attach the legs this rate was derived from
    pub fn with_chain(mut self, chain: Vec<ResolvedRate>) -> Self {
        self.chain = chain;
        self
    }

    /// True if the rate was composed from other rates
    pub fn is_derived(&self) -> bool {
        !self.chain.is_empty()
    }

    /// Convert an amount of `base` into `term`
    pub fn convert(&self, amount: Decimal) -> Result<Decimal> {
        amount.checked_mul(self.factor).ok_or_else(|| {
            RatesError::Overflow(format!(
                "{} {} x {} ({}/{})",
                amount, self.base, self.factor, self.base, self.term
            ))
        })
    }
}

impl fmt::Display for ResolvedRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} = {} ({}, {})",
            self.base,
            self.term,
            self.factor,
            self.context.rate_type,
            self.context.timestamp.format("%Y-%m-%d %H:%M UTC")
        )
    }
}

/// Day selector of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDay {
    /// A calendar day in the provider's reference zone
    Date(NaiveDate),
    /// Any instant; normalized to the reference-zone day it falls on
    Instant(DateTime<Utc>),
}

/// Request for the rate between two currencies
///
/// Without a day, the most recent loaded day is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionQuery {
    pub base: CurrencyCode,
    pub term: CurrencyCode,
    pub day: Option<QueryDay>,
}

impl ConversionQuery {
    pub fn new(base: CurrencyCode, term: CurrencyCode) -> Self {
        Self {
            base,
            term,
            day: None,
        }
    }

    /// Restrict the query to a calendar day
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.day = Some(QueryDay::Date(date));
        self
    }

    /// Restrict the query to the day an instant falls on
    pub fn at(mut self, instant: DateTime<Utc>) -> Self {
        self.day = Some(QueryDay::Instant(instant));
        self
    }
}

/// Trait for serving exchange rates
pub trait RateProvider: Send + Sync {
    /// Identity of this provider
    fn provider_context(&self) -> &ProviderContext;

    /// Resolve a query
    ///
    /// `Ok(None)` means the rate is unknown (nothing loaded yet, or no data
    /// for the day). A missing query is a precondition violation.
    fn resolve(&self, query: Option<&ConversionQuery>) -> Result<Option<ResolvedRate>>;

    /// Get the rate between two currencies, on `date` or the latest day
    fn get_rate(
        &self,
        base: CurrencyCode,
        term: CurrencyCode,
        date: Option<NaiveDate>,
    ) -> Result<Option<ResolvedRate>> {
        let query = ConversionQuery::new(base, term);
        let query = match date {
            Some(date) => query.on(date),
            None => query,
        };
        self.resolve(Some(&query))
    }

    /// Check if a rate is available
    fn is_available(&self, query: &ConversionQuery) -> bool {
        matches!(self.resolve(Some(query)), Ok(Some(_)))
    }
}
