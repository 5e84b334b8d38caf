//! Foreign Exchange (FX) rate resolution over a single-base daily feed
//!
//! # Components
//!
//! - **base**: Core types and the RateProvider trait
//! - **table**: Day-bucketed concurrent rate table
//! - **recent**: Lazily computed latest-day pointer
//! - **reversal**: Rate inversion at decimal64 precision
//! - **resolver**: Reversal and triangulation through the feed base
//! - **loader**: Merging parsed feeds into the table, feed delivery traits
//! - **parser**: ECB CSV and triples CSV feed parsers
//! - **provider**: Provider wiring all of the above for one feed variant
//!
//! # Example
//!
//! ```rust
//! use rusty_rates::config::ProviderConfig;
//! use rusty_rates::currency::CurrencyCode;
//! use rusty_rates::data::fx::{parse_ecb_csv, EcbRateProvider, RateProvider};
//! use rust_decimal_macros::dec;
//!
//! let provider = EcbRateProvider::new(ProviderConfig::default()).unwrap();
//! provider
//!     .merge(parse_ecb_csv("Date,USD,JPY\n2024-01-02,1.10,130.0\n").unwrap())
//!     .unwrap();
//!
//! // USD -> EUR -> JPY
//! let rate = provider
//!     .get_rate(CurrencyCode::USD, "JPY".parse().unwrap(), None)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(rate.factor, dec!(118.181818181818183));
//! assert_eq!(rate.chain.len(), 2);
//! ```

pub mod base;
pub mod loader;
pub mod parser;
pub mod provider;
pub mod recent;
pub mod resolver;
pub mod reversal;
pub mod table;

pub use base::{
    ConversionContext, ConversionQuery, ProviderContext, QueryDay, RateEntry, RateProvider,
    RateType, ResolvedRate,
};
pub use loader::{FeedListener, FeedLoader, FeedRecord, FileFeedLoader, LoaderBridge, MergeReport};
pub use parser::{parse_ecb_csv, parse_triples_csv, FeedFormat};
pub use provider::EcbRateProvider;
pub use recent::RecentDay;
pub use resolver::Resolver;
pub use reversal::{invert_factor, reverse, DECIMAL64_DIGITS};
pub use table::{DayBucket, RateTable};
