//! Loader bridge between feed delivery and the rate table
//!
//! A delivered feed is parsed into [`FeedRecord`] triples, validated as a
//! whole, grouped into one [`DayBucket`] per day and installed bucket by
//! bucket. A feed that fails to parse or validate leaves the table exactly
//! as it was; the failure is logged and the next scheduled load retries.

use super::base::RateEntry;
use super::parser::FeedFormat;
use super::recent::RecentDay;
use super::table::{DayBucket, RateTable};
use crate::calendar::DayClock;
use crate::currency::CurrencyCode;
use crate::error::{RatesError, Result};
use chrono::NaiveDate;
use hashbrown::HashMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

/// One parsed rate: on `day`, 1 feed-base unit = `factor` units of `currency`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    pub day: NaiveDate,
    pub currency: CurrencyCode,
    pub factor: Decimal,
}

impl FeedRecord {
    pub fn new(day: NaiveDate, currency: CurrencyCode, factor: Decimal) -> Self {
        Self {
            day,
            currency,
            factor,
        }
    }
}

/// Outcome of a successful merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
    /// Days contained in the feed
    pub days_total: usize,
    /// Days that were not loaded before
    pub days_added: usize,
    /// Days whose bucket was replaced
    pub days_replaced: usize,
    /// Rate entries installed
    pub entries: usize,
}

/// Receives delivered feed payloads
pub trait FeedListener: Send + Sync {
    fn new_data_loaded(&self, data_id: &str, payload: &str);
}

/// Delivers feed payloads to listeners, on its own schedule
pub trait FeedLoader {
    /// Subscribe a listener to a data id
    fn add_listener(&self, data_id: &str, listener: Arc<dyn FeedListener>);

    /// Start loading `data_id` in the background; listeners are notified on completion
    fn load_data_async(&self, data_id: &str) -> Result<()>;
}

/// Writes parsed feeds into the rate table
#[derive(Debug, Clone)]
pub struct LoaderBridge {
    base: CurrencyCode,
    clock: DayClock,
    format: FeedFormat,
    table: Arc<RateTable>,
    recent: Arc<RecentDay>,
}

impl LoaderBridge {
    pub fn new(
        base: CurrencyCode,
        clock: DayClock,
        format: FeedFormat,
        table: Arc<RateTable>,
        recent: Arc<RecentDay>,
    ) -> Self {
        Self {
            base,
            clock,
            format,
            table,
            recent,
        }
    }

    /// Merge a parsed feed into the table
    ///
    /// All records are validated before anything is installed. Each day is
    /// installed as one write, replacing any earlier bucket for that day.
    pub fn merge(&self, records: Vec<FeedRecord>) -> Result<MergeReport> {
        let mut grouped: BTreeMap<NaiveDate, Vec<RateEntry>> = BTreeMap::new();
        for record in records {
            if record.factor <= Decimal::ZERO {
                return Err(RatesError::DataError(format!(
                    "Rate for {} on {} must be positive, got: {}",
                    record.currency, record.day, record.factor
                )));
            }
            if record.currency == self.base {
                log::debug!("Skipping {} quoted against itself on {}", self.base, record.day);
                continue;
            }
            grouped
                .entry(record.day)
                .or_default()
                .push(RateEntry::new(record.currency, record.factor));
        }

        let mut report = MergeReport {
            days_total: grouped.len(),
            ..MergeReport::default()
        };

        for (day, entries) in grouped {
            let bucket = DayBucket::from_entries(entries);
            report.entries += bucket.len();
            if self.table.install(self.clock.key_for_date(day), bucket) {
                report.days_added += 1;
            } else {
                report.days_replaced += 1;
            }
        }

        self.recent.invalidate();
        Ok(report)
    }

    /// Merge the outcome of a load, logging instead of propagating failures
    pub fn on_feed(&self, data_id: &str, feed: Result<Vec<FeedRecord>>) -> Option<MergeReport> {
        let merged = feed.and_then(|records| self.merge(records));
        match merged {
            Ok(report) => {
                log::info!(
                    "Loaded {} exchange rates for days: {} ({} replaced, {} entries)",
                    data_id,
                    report.days_added,
                    report.days_replaced,
                    report.entries
                );
                Some(report)
            }
            Err(e) => {
                log::warn!("Error during {} data load, keeping previous rates: {}", data_id, e);
                None
            }
        }
    }

    /// Parse a raw payload in the configured format and merge it
    pub fn on_raw(&self, data_id: &str, payload: &str) -> Option<MergeReport> {
        self.on_feed(data_id, self.format.parse(payload))
    }
}

/// Feed loader reading payloads from local files
///
/// Each data id maps to a file. Asynchronous loads run on a spawned thread.
#[derive(Default)]
pub struct FileFeedLoader {
    sources: RwLock<HashMap<String, PathBuf>>,
    listeners: RwLock<HashMap<String, Vec<Arc<dyn FeedListener>>>>,
}

impl FileFeedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a data id to a file
    pub fn register<P: AsRef<Path>>(&self, data_id: &str, path: P) {
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(data_id.to_string(), path.as_ref().to_path_buf());
    }

    /// Read `data_id` on the calling thread and notify listeners
    pub fn load_data_blocking(&self, data_id: &str) -> Result<()> {
        let path = self.source(data_id)?;
        let payload = fs::read_to_string(&path)?;
        notify(&self.listeners_of(data_id), data_id, &payload);
        Ok(())
    }

    /// Read `data_id` on a new thread; the handle completes after listeners ran
    pub fn spawn_load(&self, data_id: &str) -> Result<JoinHandle<()>> {
        let path = self.source(data_id)?;
        let listeners = self.listeners_of(data_id);
        let data_id = data_id.to_string();

        let handle = thread::Builder::new()
            .name(format!("feed-loader-{}", data_id))
            .spawn(move || match fs::read_to_string(&path) {
                Ok(payload) => notify(&listeners, &data_id, &payload),
                Err(e) => log::warn!("Failed to read {} from {}: {}", data_id, path.display(), e),
            })?;
        Ok(handle)
    }

    fn source(&self, data_id: &str) -> Result<PathBuf> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(data_id)
            .cloned()
            .ok_or_else(|| RatesError::ConfigError(format!("No source registered for {}", data_id)))
    }

    fn listeners_of(&self, data_id: &str) -> Vec<Arc<dyn FeedListener>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(data_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl FeedLoader for FileFeedLoader {
    fn add_listener(&self, data_id: &str, listener: Arc<dyn FeedListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(data_id.to_string())
            .or_default()
            .push(listener);
    }

    fn load_data_async(&self, data_id: &str) -> Result<()> {
        self.spawn_load(data_id).map(|_| ())
    }
}

fn notify(listeners: &[Arc<dyn FeedListener>], data_id: &str, payload: &str) {
    if listeners.is_empty() {
        log::debug!("No listeners for {}", data_id);
    }
    for listener in listeners {
        listener.new_data_loaded(data_id, payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use std::sync::Mutex;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn bridge() -> (LoaderBridge, Arc<RateTable>, Arc<RecentDay>) {
        let table = Arc::new(RateTable::new());
        let recent = Arc::new(RecentDay::new());
        let bridge = LoaderBridge::new(
            CurrencyCode::EUR,
            DayClock::default(),
            FeedFormat::Triples,
            Arc::clone(&table),
            Arc::clone(&recent),
        );
        (bridge, table, recent)
    }

    #[test]
    fn test_merge_groups_by_day() {
        let (bridge, table, _) = bridge();
        let jpy: CurrencyCode = "JPY".parse().unwrap();

        let report = bridge
            .merge(vec![
                FeedRecord::new(date(2), CurrencyCode::USD, dec!(1.10)),
                FeedRecord::new(date(2), jpy, dec!(130.0)),
                FeedRecord::new(date(3), CurrencyCode::USD, dec!(1.09)),
            ])
            .unwrap();

        assert_eq!(report.days_total, 2);
        assert_eq!(report.days_added, 2);
        assert_eq!(report.entries, 3);

        let clock = DayClock::default();
        let bucket = table.bucket(clock.key_for_date(date(2))).unwrap();
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.get(&jpy).unwrap().factor, dec!(130.0));
    }

    #[test]
    fn test_merge_replaces_whole_day() {
        let (bridge, table, _) = bridge();
        let jpy: CurrencyCode = "JPY".parse().unwrap();
        bridge
            .merge(vec![
                FeedRecord::new(date(2), CurrencyCode::USD, dec!(1.10)),
                FeedRecord::new(date(2), jpy, dec!(130.0)),
            ])
            .unwrap();

        let report = bridge
            .merge(vec![FeedRecord::new(date(2), CurrencyCode::USD, dec!(1.11))])
            .unwrap();
        assert_eq!(report.days_added, 0);
        assert_eq!(report.days_replaced, 1);

        // No leftovers from the previous bucket
        let bucket = table.bucket(DayClock::default().key_for_date(date(2))).unwrap();
        assert_eq!(bucket.len(), 1);
        assert!(bucket.get(&jpy).is_none());
    }

    #[test]
    fn test_merge_invalidates_recent_day() {
        let (bridge, table, recent) = bridge();
        bridge
            .merge(vec![FeedRecord::new(date(2), CurrencyCode::USD, dec!(1.10))])
            .unwrap();
        let first = recent.get_or_compute(&table).unwrap();

        bridge
            .merge(vec![FeedRecord::new(date(3), CurrencyCode::USD, dec!(1.09))])
            .unwrap();
        assert_eq!(recent.peek(), None);
        assert!(recent.get_or_compute(&table).unwrap() > first);
    }

    #[test]
    fn test_invalid_feed_leaves_table_untouched() {
        let (bridge, table, recent) = bridge();
        bridge
            .merge(vec![FeedRecord::new(date(2), CurrencyCode::USD, dec!(1.10))])
            .unwrap();
        let cached = recent.get_or_compute(&table);

        let result = bridge.merge(vec![
            FeedRecord::new(date(3), CurrencyCode::USD, dec!(1.09)),
            FeedRecord::new(date(4), CurrencyCode::USD, dec!(-1)),
        ]);
        assert!(matches!(result, Err(RatesError::DataError(_))));
        assert_eq!(table.len(), 1);
        assert_eq!(recent.peek(), cached);
    }

    #[test]
    fn test_base_currency_entries_skipped() {
        let (bridge, table, _) = bridge();
        let report = bridge
            .merge(vec![
                FeedRecord::new(date(2), CurrencyCode::EUR, dec!(1)),
                FeedRecord::new(date(2), CurrencyCode::USD, dec!(1.10)),
            ])
            .unwrap();
        assert_eq!(report.entries, 1);
        let bucket = table.bucket(DayClock::default().key_for_date(date(2))).unwrap();
        assert!(bucket.get(&CurrencyCode::EUR).is_none());
    }

    #[test]
    fn test_on_raw_swallows_parse_errors() {
        let (bridge, table, _) = bridge();
        assert!(bridge.on_raw("ECBHist", "2024-01-02,USD,1.10\n").is_some());
        assert!(bridge.on_raw("ECBHist", "2024-01-03,USD,not-a-rate\n").is_none());
        assert_eq!(table.len(), 1);
    }

    struct Recorder(Mutex<Vec<(String, String)>>);

    impl FeedListener for Recorder {
        fn new_data_loaded(&self, data_id: &str, payload: &str) {
            self.0
                .lock()
                .unwrap()
                .push((data_id.to_string(), payload.to_string()));
        }
    }

    #[test]
    fn test_file_loader_notifies_listeners() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "2024-01-02,USD,1.10\n").unwrap();

        let loader = FileFeedLoader::new();
        loader.register("ECBCurrent", file.path());
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        loader.add_listener("ECBCurrent", recorder.clone());

        loader.spawn_load("ECBCurrent").unwrap().join().unwrap();
        loader.load_data_blocking("ECBCurrent").unwrap();

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "ECBCurrent");
        assert!(seen[0].1.contains("USD"));
    }

    #[test]
    fn test_file_loader_unknown_id() {
        let loader = FileFeedLoader::new();
        assert!(matches!(
            loader.load_data_async("ECBHist"),
            Err(RatesError::ConfigError(_))
        ));
    }
}
