//! Day-bucketed rate table
//!
//! Maps each [`DayKey`] to an immutable [`DayBucket`] holding that day's
//! base-relative rates. Buckets are published whole behind an `Arc`; a newer
//! fetch of the same day swaps the `Arc`, so readers see either the old or
//! the new bucket, never a mix.

use super::base::RateEntry;
use crate::calendar::DayKey;
use crate::currency::CurrencyCode;
use dashmap::DashMap;
use hashbrown::HashMap;
use std::sync::Arc;

/// Immutable set of currency -> rate entries valid for one day
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayBucket {
    entries: HashMap<CurrencyCode, RateEntry>,
}

impl DayBucket {
    /// Build a bucket; a later entry for the same currency wins
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = RateEntry>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.currency, entry))
                .collect(),
        }
    }

    pub fn get(&self, currency: &CurrencyCode) -> Option<&RateEntry> {
        self.entries.get(currency)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Currencies quoted on this day, sorted
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        let mut codes: Vec<_> = self.entries.keys().copied().collect();
        codes.sort();
        codes
    }
}

/// Concurrent map from day to that day's bucket
#[derive(Debug, Default)]
pub struct RateTable {
    days: DashMap<DayKey, Arc<DayBucket>>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a bucket for `day`, replacing any previous one in a single write
    ///
    /// Returns true if the day was not present before.
    pub fn install(&self, day: DayKey, bucket: DayBucket) -> bool {
        self.days.insert(day, Arc::new(bucket)).is_none()
    }

    /// Snapshot of the bucket for `day`
    pub fn bucket(&self, day: DayKey) -> Option<Arc<DayBucket>> {
        self.days.get(&day).map(|bucket| Arc::clone(bucket.value()))
    }

    pub fn contains(&self, day: DayKey) -> bool {
        self.days.contains_key(&day)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of days loaded
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Latest day present
    pub fn max_day(&self) -> Option<DayKey> {
        self.days.iter().map(|entry| *entry.key()).max()
    }

    /// All loaded days, ascending
    pub fn days(&self) -> Vec<DayKey> {
        let mut days: Vec<_> = self.days.iter().map(|entry| *entry.key()).collect();
        days.sort();
        days
    }
}
