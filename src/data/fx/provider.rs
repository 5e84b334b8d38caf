//! ECB-style rate provider
//!
//! Wires the rate table, recent-day pointer, loader bridge and resolver
//! together for one feed variant. Construction is complete before the
//! provider is handed to a feed loader: call [`EcbRateProvider::start`]
//! on the `Arc` once it exists.

use super::base::{ConversionQuery, ProviderContext, RateProvider, RateType, ResolvedRate};
use super::loader::{FeedListener, FeedLoader, FeedRecord, LoaderBridge, MergeReport};
use super::recent::RecentDay;
use super::resolver::Resolver;
use super::table::RateTable;
use crate::config::ProviderConfig;
use crate::error::Result;
use chrono::NaiveDate;
use std::sync::Arc;

/// Rate provider over a single-base daily feed
///
/// # Example
/// ```
/// use rusty_rates::config::ProviderConfig;
/// use rusty_rates::currency::CurrencyCode;
/// use rusty_rates::data::fx::{EcbRateProvider, FeedRecord, RateProvider};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let provider = EcbRateProvider::new(ProviderConfig::default()).unwrap();
/// let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// provider
///     .merge(vec![FeedRecord::new(day, CurrencyCode::USD, dec!(1.10))])
///     .unwrap();
///
/// let rate = provider
///     .get_rate(CurrencyCode::USD, CurrencyCode::EUR, Some(day))
///     .unwrap()
///     .unwrap();
/// assert_eq!(rate.factor, dec!(0.9090909090909091));
/// ```
#[derive(Debug)]
pub struct EcbRateProvider {
    config: ProviderConfig,
    table: Arc<RateTable>,
    bridge: LoaderBridge,
    resolver: Resolver,
}

impl EcbRateProvider {
    /// Create a provider with an empty rate table
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        let clock = config.clock()?;
        let table = Arc::new(RateTable::new());
        let recent = Arc::new(RecentDay::new());
        let context =
            ProviderContext::new(config.variant.provider_name(), vec![RateType::Historic]);

        let bridge = LoaderBridge::new(
            config.base_currency,
            clock,
            config.feed_format,
            Arc::clone(&table),
            Arc::clone(&recent),
        );
        let resolver =
            Resolver::new(config.base_currency, clock, context, Arc::clone(&table), recent);

        Ok(Self {
            config,
            table,
            bridge,
            resolver,
        })
    }

    /// Subscribe to `loader` and request the first load
    pub fn start(self: &Arc<Self>, loader: &dyn FeedLoader) -> Result<()> {
        let listener: Arc<dyn FeedListener> = Arc::clone(self) as Arc<dyn FeedListener>;
        loader.add_listener(self.data_id(), listener);
        loader.load_data_async(self.data_id())
    }

    /// Merge already-parsed records directly
    pub fn merge(&self, records: Vec<FeedRecord>) -> Result<MergeReport> {
        self.bridge.merge(records)
    }

    /// Loader id of the configured feed variant
    pub fn data_id(&self) -> &'static str {
        self.config.variant.data_id()
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn bridge(&self) -> &LoaderBridge {
        &self.bridge
    }

    /// Loaded calendar days, ascending
    pub fn loaded_days(&self) -> Vec<NaiveDate> {
        let clock = self.resolver.clock();
        self.table.days().into_iter().map(|day| clock.date_of(day)).collect()
    }

    /// Most recent loaded calendar day
    pub fn latest_day(&self) -> Option<NaiveDate> {
        self.resolver
            .latest_day()
            .map(|day| self.resolver.clock().date_of(day))
    }
}

impl RateProvider for EcbRateProvider {
    fn provider_context(&self) -> &ProviderContext {
        self.resolver.context()
    }

    fn resolve(&self, query: Option<&ConversionQuery>) -> Result<Option<ResolvedRate>> {
        self.resolver.resolve(query)
    }
}

impl FeedListener for EcbRateProvider {
    fn new_data_loaded(&self, data_id: &str, payload: &str) {
        if data_id != self.data_id() {
            log::debug!("Ignoring {} delivered to {} provider", data_id, self.data_id());
            return;
        }
        self.bridge.on_raw(data_id, payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedVariant;
    use crate::currency::CurrencyCode;
    use crate::data::fx::loader::FileFeedLoader;
    use crate::data::fx::FeedFormat;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_provider_context_follows_variant() {
        let provider =
            EcbRateProvider::new(ProviderConfig::for_variant(FeedVariant::Historic90)).unwrap();
        assert_eq!(provider.provider_context().provider, "ECB-HIST90");
        assert_eq!(provider.data_id(), "ECBHist90");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ProviderConfig {
            timezone: "Mars/Olympus".to_string(),
            ..ProviderConfig::default()
        };
        assert!(EcbRateProvider::new(config).is_err());

        let config = ProviderConfig {
            base_currency: CurrencyCode::USD,
            ..ProviderConfig::default()
        };
        let err = EcbRateProvider::new(config).unwrap_err();
        assert!(matches!(err, crate::error::RatesError::ConfigError(_)));
    }

    #[test]
    fn test_merge_and_days() {
        let provider = EcbRateProvider::new(ProviderConfig::default()).unwrap();
        assert_eq!(provider.latest_day(), None);

        provider
            .merge(vec![
                FeedRecord::new(date(3), CurrencyCode::USD, dec!(1.09)),
                FeedRecord::new(date(2), CurrencyCode::USD, dec!(1.10)),
            ])
            .unwrap();

        assert_eq!(provider.loaded_days(), vec![date(2), date(3)]);
        assert_eq!(provider.latest_day(), Some(date(3)));
    }

    #[test]
    fn test_ignores_other_data_ids() {
        let provider = EcbRateProvider::new(ProviderConfig::default()).unwrap();
        provider.new_data_loaded("ECBHist", "Date,USD\n2024-01-02,1.10\n");
        assert!(provider.loaded_days().is_empty());

        provider.new_data_loaded("ECBCurrent", "Date,USD\n2024-01-02,1.10\n");
        assert_eq!(provider.loaded_days(), vec![date(2)]);
    }

    #[test]
    fn test_start_with_file_loader() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "2024-01-02,USD,1.10").unwrap();
        writeln!(file, "2024-01-02,JPY,130.0").unwrap();

        let config = ProviderConfig {
            feed_format: FeedFormat::Triples,
            ..ProviderConfig::default()
        };
        let provider = Arc::new(EcbRateProvider::new(config).unwrap());
        let loader = FileFeedLoader::new();
        loader.register(provider.data_id(), file.path());

        provider.start(&loader).unwrap();
        // Same listeners, deterministic completion
        loader.load_data_blocking(provider.data_id()).unwrap();

        let rate = provider
            .get_rate(CurrencyCode::USD, "JPY".parse().unwrap(), None)
            .unwrap()
            .unwrap();
        assert_eq!(rate.factor, dec!(118.181818181818183));
    }
}
