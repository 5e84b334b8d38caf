//! # rusty_rates
//!
//! Exchange rates between any two currencies, answered from a daily feed that
//! only publishes rates against one base currency (such as the ECB reference
//! rates, quoted against EUR).
//!
//! Loaded rates live in memory, bucketed by calendar day. Queries never do
//! I/O: rates involving the base are read or reversed directly, all other
//! pairs are triangulated through the base.
//!
//! ## Example
//!
//! ```rust
//! use rusty_rates::prelude::*;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let provider = EcbRateProvider::new(ProviderConfig::default()).unwrap();
//! let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! provider
//!     .merge(vec![FeedRecord::new(day, CurrencyCode::USD, dec!(1.10))])
//!     .unwrap();
//!
//! let rate = provider
//!     .get_rate(CurrencyCode::EUR, CurrencyCode::USD, Some(day))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(rate.factor, dec!(1.10));
//! ```

pub mod calendar;
pub mod config;
pub mod currency;
pub mod data;
pub mod error;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::calendar::{DayClock, DayKey};
    pub use crate::config::{FeedVariant, ProviderConfig};
    pub use crate::currency::{CurrencyCode, CurrencyPair};
    pub use crate::data::fx::{
        ConversionQuery, EcbRateProvider, FeedRecord, RateProvider, ResolvedRate,
    };
    pub use crate::error::{RatesError, Result};
}
