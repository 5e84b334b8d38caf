//! Calendar-day keys in a fixed reference time zone
//!
//! Rates are bucketed by calendar day. A [`DayKey`] is the instant of local
//! midnight of that day in the feed's reference zone, in epoch milliseconds.
//! Ingestion and querying must both go through the same [`DayClock`] or
//! lookups silently miss.

use crate::error::{RatesError, Result};
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference zone of the ECB reference rates (published around 16:00 CET)
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Berlin;

/// Midnight of one calendar day, as epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(i64);

impl DayKey {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    /// The key as a UTC instant
    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.timestamp().to_rfc3339())
    }
}

/// Normalizes dates and timestamps to [`DayKey`]s in one reference zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayClock {
    tz: Tz,
}

impl DayClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build from an IANA zone name such as `Europe/Berlin`
    pub fn from_name(name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|e| RatesError::ConfigError(format!("Unknown time zone {}: {}", name, e)))?;
        Ok(Self::new(tz))
    }

    /// Get the reference zone
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Key of a calendar day
    pub fn key_for_date(&self, date: NaiveDate) -> DayKey {
        DayKey(self.local_midnight(date).timestamp_millis())
    }

    /// Key of the calendar day an instant falls on, seen from the reference zone
    pub fn key_for_datetime<Z: TimeZone>(&self, dt: &DateTime<Z>) -> DayKey {
        self.key_for_date(self.date_of_instant(dt))
    }

    /// Local calendar date of an instant in the reference zone
    pub fn date_of_instant<Z: TimeZone>(&self, dt: &DateTime<Z>) -> NaiveDate {
        dt.with_timezone(&self.tz).date_naive()
    }

    /// Calendar day a key stands for
    pub fn date_of(&self, key: DayKey) -> NaiveDate {
        self.date_of_instant(&key.timestamp())
    }

    fn local_midnight(&self, date: NaiveDate) -> DateTime<Tz> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self.tz.from_local_datetime(&midnight) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            // Midnight skipped by a DST change: first valid local minute of the day
            LocalResult::None => (1..=180)
                .find_map(|m| {
                    self.tz
                        .from_local_datetime(&(midnight + Duration::minutes(m)))
                        .earliest()
                })
                .unwrap_or_else(|| Utc.from_utc_datetime(&midnight).with_timezone(&self.tz)),
        }
    }
}

impl Default for DayClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}
