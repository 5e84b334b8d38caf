//! Feed parsers turning published rate files into [`FeedRecord`] triples
//!
//! Two layouts are understood:
//!
//! - **ECB wide CSV** (`eurofxref.csv`, `eurofxref-hist.csv`): a `Date` column
//!   followed by one column per currency, one row per day. Missing values are
//!   published as `N/A`.
//! - **Triples CSV**: `date,currency,rate` rows, optionally with a header.
//!
//! A feed either parses completely or not at all.

use super::loader::FeedRecord;
use crate::currency::CurrencyCode;
use crate::error::{RatesError, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Layout of a feed file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedFormat {
    #[default]
    EcbWide,
    Triples,
}

impl FeedFormat {
    pub fn parse(&self, data: &str) -> Result<Vec<FeedRecord>> {
        match self {
            FeedFormat::EcbWide => parse_ecb_csv(data),
            FeedFormat::Triples => parse_triples_csv(data),
        }
    }
}

/// Parse the ECB wide CSV layout
///
/// # Example
/// ```
/// use rusty_rates::data::fx::parse_ecb_csv;
///
/// let csv = "Date, USD, JPY, \n2024-01-02, 1.0956, 155.56, \n";
/// let records = parse_ecb_csv(csv).unwrap();
/// assert_eq!(records.len(), 2);
/// ```
pub fn parse_ecb_csv(data: &str) -> Result<Vec<FeedRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data.as_bytes());

    let headers = reader.headers()?.clone();
    if !headers
        .get(0)
        .map(|h| h.eq_ignore_ascii_case("date"))
        .unwrap_or(false)
    {
        return Err(RatesError::ParseError(
            "ECB feed must start with a Date column".to_string(),
        ));
    }

    // Trailing separators produce empty header cells
    let columns = headers
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, h)| !h.is_empty())
        .map(|(idx, h)| CurrencyCode::new(h).map(|code| (idx, code)))
        .collect::<Result<Vec<_>>>()?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let line = row + 2;
        let record = result?;
        if is_blank(&record) {
            continue;
        }

        let day = parse_date(field(&record, 0, line)?, line)?;
        for (idx, currency) in &columns {
            let cell = record.get(*idx).unwrap_or("");
            if cell.is_empty() || cell.eq_ignore_ascii_case("N/A") {
                continue;
            }
            records.push(FeedRecord::new(day, *currency, parse_rate(cell, line)?));
        }
    }

    Ok(records)
}

/// Parse `date,currency,rate` rows
///
/// Lines starting with `#` are comments. A first row whose date column reads
/// `date` is treated as a header.
pub fn parse_triples_csv(data: &str) -> Result<Vec<FeedRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(data.as_bytes());

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let line = row + 1;
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        if row == 0 && field(&record, 0, line)?.eq_ignore_ascii_case("date") {
            continue;
        }
        if record.len() != 3 {
            return Err(RatesError::ParseError(format!(
                "Invalid feed row at line {}: expected 3 columns, got {}",
                line,
                record.len()
            )));
        }

        let day = parse_date(field(&record, 0, line)?, line)?;
        let currency = CurrencyCode::new(field(&record, 1, line)?)?;
        let factor = parse_rate(field(&record, 2, line)?, line)?;
        records.push(FeedRecord::new(day, currency, factor));
    }

    Ok(records)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.is_empty())
}

fn field<'r>(record: &'r StringRecord, idx: usize, line: usize) -> Result<&'r str> {
    record.get(idx).ok_or_else(|| {
        RatesError::ParseError(format!("Missing column {} at line {}", idx + 1, line))
    })
}

/// Dates come as `2024-01-02` in the history files and `02 January 2024` in the daily file
fn parse_date(s: &str, line: usize) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d %B %Y"))
        .map_err(|e| {
            RatesError::ParseError(format!("Invalid date '{}' at line {}: {}", s, line, e))
        })
}

fn parse_rate(s: &str, line: usize) -> Result<Decimal> {
    Decimal::from_str(s).map_err(|e| {
        RatesError::ParseError(format!("Invalid rate '{}' at line {}: {}", s, line, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HIST: &str = "Date,USD,JPY,CYP,\n\
                        2024-01-03,1.0919,155.22,N/A,\n\
                        2024-01-02,1.0956,155.56,N/A,\n";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_ecb_history() {
        let records = parse_ecb_csv(HIST).unwrap();
        assert_eq!(records.len(), 4);

        let usd = CurrencyCode::USD;
        assert!(records.contains(&FeedRecord::new(date(2024, 1, 2), usd, dec!(1.0956))));
        assert!(records.contains(&FeedRecord::new(
            date(2024, 1, 3),
            "JPY".parse().unwrap(),
            dec!(155.22)
        )));
        // N/A cells are skipped
        assert!(records.iter().all(|r| r.currency.as_str() != "CYP"));
    }

    #[test]
    fn test_parse_ecb_daily_layout() {
        let daily = "Date, USD, JPY, \n04 January 2024, 1.0944, 157.84, \n";
        let records = parse_ecb_csv(daily).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].day, date(2024, 1, 4));
        assert_eq!(records[0].factor, dec!(1.0944));
    }

    #[test]
    fn test_parse_ecb_keeps_published_scale() {
        let records = parse_ecb_csv("Date,JPY\n2024-01-02,130.0\n").unwrap();
        assert_eq!(records[0].factor.scale(), 1);
    }

    #[test]
    fn test_parse_ecb_rejects_bad_cell() {
        let bad = "Date,USD\n2024-01-02,1.09\n2024-01-03,abc\n";
        let err = parse_ecb_csv(bad).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_parse_ecb_rejects_bad_header() {
        assert!(parse_ecb_csv("Day,USD\n2024-01-02,1.09\n").is_err());
        assert!(parse_ecb_csv("Date,US\n2024-01-02,1.09\n").is_err());
    }

    #[test]
    fn test_parse_triples() {
        let data = "# ECB reference rates\n\
                    date,currency,rate\n\
                    2024-01-02,USD,1.10\n\
                    2024-01-02,jpy,130.0\n";
        let records = parse_triples_csv(data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].currency.as_str(), "JPY");
        assert_eq!(records[1].factor, dec!(130.0));
    }

    #[test]
    fn test_parse_triples_wrong_arity() {
        assert!(parse_triples_csv("2024-01-02,USD\n").is_err());
        assert!(parse_triples_csv("2024-01-02,USD,1.1,extra\n").is_err());
    }

    #[test]
    fn test_feed_format_dispatch() {
        let records = FeedFormat::Triples.parse("2024-01-02,USD,1.10\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(FeedFormat::default(), FeedFormat::EcbWide);
    }
}
