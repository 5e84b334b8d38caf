//! Rate resolution over a star-topology feed
//!
//! The feed only publishes `base -> X` rates. Any other pair is answered from
//! those by reversal (`X -> base`) or triangulation through the base
//! (`X -> base -> Y`). All lookups for one query read the same day's bucket.

use super::base::{ConversionQuery, ProviderContext, QueryDay, RateEntry, ResolvedRate};
use super::recent::RecentDay;
use super::reversal::reverse;
use super::table::{DayBucket, RateTable};
use crate::calendar::{DayClock, DayKey};
use crate::currency::CurrencyCode;
use crate::error::{RatesError, Result};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Triangulation legs always touch the base, so they never recurse further
const MAX_DEPTH: u8 = 1;

/// Answers conversion queries from the rate table without any I/O
#[derive(Debug, Clone)]
pub struct Resolver {
    base: CurrencyCode,
    clock: DayClock,
    context: ProviderContext,
    table: Arc<RateTable>,
    recent: Arc<RecentDay>,
}

impl Resolver {
    pub fn new(
        base: CurrencyCode,
        clock: DayClock,
        context: ProviderContext,
        table: Arc<RateTable>,
        recent: Arc<RecentDay>,
    ) -> Self {
        Self {
            base,
            clock,
            context,
            table,
            recent,
        }
    }

    /// Feed base currency
    pub fn base(&self) -> CurrencyCode {
        self.base
    }

    pub fn clock(&self) -> &DayClock {
        &self.clock
    }

    pub fn context(&self) -> &ProviderContext {
        &self.context
    }

    /// Most recent loaded day
    pub fn latest_day(&self) -> Option<DayKey> {
        self.recent.get_or_compute(&self.table)
    }

    /// Resolve a conversion query
    ///
    /// Returns `Ok(None)` when nothing is loaded, the day has no bucket, or a
    /// rate involving the base is not published. Fails with
    /// [`RatesError::ConversionImpossible`] when neither currency is the base
    /// and one of the two legs through the base is missing.
    pub fn resolve(&self, query: Option<&ConversionQuery>) -> Result<Option<ResolvedRate>> {
        let query = query.ok_or_else(|| {
            RatesError::Precondition("Conversion query is required".to_string())
        })?;

        if self.table.is_empty() {
            return Ok(None);
        }

        let day = match query.day {
            Some(QueryDay::Date(date)) => self.clock.key_for_date(date),
            Some(QueryDay::Instant(instant)) => self.clock.key_for_datetime(&instant),
            None => match self.latest_day() {
                Some(day) => day,
                None => return Ok(None),
            },
        };

        // No fallback to a neighbouring day
        let bucket = match self.table.bucket(day) {
            Some(bucket) => bucket,
            None => return Ok(None),
        };

        self.lookup(query.base, query.term, day, &bucket, 0)
    }

    /// Resolve against one bucket snapshot so every leg sees the same day contents
    fn lookup(
        &self,
        base: CurrencyCode,
        term: CurrencyCode,
        day: DayKey,
        bucket: &DayBucket,
        depth: u8,
    ) -> Result<Option<ResolvedRate>> {
        if depth > MAX_DEPTH {
            return Err(RatesError::Precondition(format!(
                "Deriving {}/{} recursed past depth {}; feed is not quoted against {}",
                base, term, MAX_DEPTH, self.base
            )));
        }

        match (base == self.base, term == self.base) {
            (true, true) => Ok(Some(ResolvedRate::new(
                base,
                term,
                Decimal::ONE,
                self.context.historic(day),
            ))),
            (false, true) => match bucket.get(&base) {
                Some(entry) => reverse(Some(&self.published(entry, day))).map(Some),
                None => Ok(None),
            },
            (true, false) => Ok(bucket.get(&term).map(|entry| self.published(entry, day))),
            (false, false) => self.triangulate(base, term, day, bucket, depth).map(Some),
        }
    }

    /// `base -> feed base -> term`, both legs on `day`
    fn triangulate(
        &self,
        base: CurrencyCode,
        term: CurrencyCode,
        day: DayKey,
        bucket: &DayBucket,
        depth: u8,
    ) -> Result<ResolvedRate> {
        let to_feed_base = self.lookup(base, self.base, day, bucket, depth + 1)?;
        let from_feed_base = self.lookup(self.base, term, day, bucket, depth + 1)?;

        let (leg1, leg2) = match (to_feed_base, from_feed_base) {
            (Some(leg1), Some(leg2)) => (leg1, leg2),
            _ => return Err(RatesError::ConversionImpossible { base, term, day }),
        };

        let factor = leg1.factor.checked_mul(leg2.factor).ok_or_else(|| {
            RatesError::Overflow(format!("{}/{} = {} x {}", base, term, leg1.factor, leg2.factor))
        })?;

        log::debug!("Derived {}/{} = {} via {}", base, term, factor, self.base);

        Ok(ResolvedRate::new(base, term, factor, self.context.historic(day))
            .with_chain(vec![leg1, leg2]))
    }

    fn published(&self, entry: &RateEntry, day: DayKey) -> ResolvedRate {
        ResolvedRate::new(
            self.base,
            entry.currency,
            entry.factor,
            self.context.historic(day),
        )
    }
}
