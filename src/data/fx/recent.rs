//! Recent-day pointer
//!
//! Caches the latest day present in a [`RateTable`]. Recomputing it is just
//! "max of current keys", so racing threads may all recompute and publish.
//! No lock is taken. Every invalidation bumps an epoch, and a value scanned
//! before an invalidation is withdrawn instead of outliving it.

use super::table::RateTable;
use crate::calendar::DayKey;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Marker for "not computed since the last invalidation"
const UNKNOWN: i64 = i64::MIN;

#[derive(Debug)]
pub struct RecentDay {
    cached: AtomicI64,
    epoch: AtomicU64,
}

impl RecentDay {
    pub fn new() -> Self {
        Self {
            cached: AtomicI64::new(UNKNOWN),
            epoch: AtomicU64::new(0),
        }
    }

    /// Cached latest day, computing and publishing it if unknown
    ///
    /// Returns `None` only when the table is empty; an empty result is never cached.
    pub fn get_or_compute(&self, table: &RateTable) -> Option<DayKey> {
        loop {
            if let Some(day) = self.peek() {
                return Some(day);
            }
            let epoch = self.epoch.load(Ordering::SeqCst);
            let day = table.max_day()?.millis();
            // Days only grow, so the larger of two racing computations is the fresher one
            let published = self.cached.fetch_max(day, Ordering::SeqCst).max(day);

            if self.epoch.load(Ordering::SeqCst) == epoch {
                return Some(DayKey::from_millis(published));
            }
            // A merge landed during the scan: withdraw what was published and rescan
            let _ = self.cached.compare_exchange(
                published,
                UNKNOWN,
                Ordering::SeqCst,
                Ordering::SeqCst,
            );
        }
    }

    /// Cached value without computing
    pub fn peek(&self) -> Option<DayKey> {
        match self.cached.load(Ordering::SeqCst) {
            UNKNOWN => None,
            millis => Some(DayKey::from_millis(millis)),
        }
    }

    /// Forget the cached day; called after every merge
    pub fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cached.store(UNKNOWN, Ordering::SeqCst);
    }
}

impl Default for RecentDay {
    fn default() -> Self {
        Self::new()
    }
}
