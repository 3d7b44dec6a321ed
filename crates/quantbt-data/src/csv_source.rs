//! CSV-backed price provider.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use quantbt_core::error::DataError;
use quantbt_core::traits::PriceProvider;
use quantbt_core::types::Bar;

use crate::day_range_ms;

/// CSV record format. Header names follow the usual daily-quote export
/// conventions.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Price provider reading daily bars from CSV files.
///
/// The root may be a single file (serving whatever symbol is asked
/// for) or a directory holding one `{symbol}.csv` per symbol.
pub struct CsvPriceSource {
    root: PathBuf,
}

impl CsvPriceSource {
    /// Create a provider over a file or directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, DataError> {
        let root = root.into();
        if !root.exists() {
            return Err(DataError::Internal(format!(
                "data path '{}' does not exist",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    fn file_for(&self, symbol: &str) -> Result<PathBuf, DataError> {
        if self.root.is_file() {
            return Ok(self.root.clone());
        }

        let candidates = [
            self.root.join(format!("{}.csv", symbol)),
            self.root.join(format!("{}.csv", symbol.to_lowercase())),
            self.root.join(format!("{}_daily.csv", symbol)),
            self.root.join(format!("{}_daily.csv", symbol.to_lowercase())),
        ];
        candidates
            .into_iter()
            .find(|p| p.exists())
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
    }

    fn load_from_path(&self, path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut bars = Vec::new();
        for result in reader.deserialize() {
            let record: CsvRecord =
                result.map_err(|e| DataError::MalformedSeries(e.to_string()))?;
            let timestamp = parse_timestamp(&record.date)?;
            bars.push(Bar::new(
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ));
        }

        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

/// Parse the timestamp formats seen in daily-quote CSV exports.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    let formats = [
        "%Y-%m-%d",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%d-%m-%Y",
    ];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            let dt = d.and_hms_opt(0, 0, 0).unwrap();
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    // Unix timestamp, milliseconds when longer than 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        if ts > 10_000_000_000 {
            return Ok(ts);
        } else {
            return Ok(ts * 1000);
        }
    }

    Err(DataError::ParseError(format!(
        "could not parse date: {}",
        date_str
    )))
}

#[async_trait]
impl PriceProvider for CsvPriceSource {
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let path = self.file_for(symbol)?;
        let (start_ms, end_ms) = day_range_ms(start, end);

        let bars: Vec<Bar> = self
            .load_from_path(&path)?
            .into_iter()
            .filter(|b| b.timestamp >= start_ms && b.timestamp < end_ms)
            .collect();

        debug!(symbol, bars = bars.len(), path = %path.display(), "csv load");
        if bars.is_empty() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(bars)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-15").is_ok());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_ok());
        assert!(parse_timestamp("2024/01/15").is_ok());
        assert!(parse_timestamp("1705312800000").is_ok()); // Unix ms
        assert!(parse_timestamp("1705312800").is_ok()); // Unix sec
        assert!(parse_timestamp("not a date").is_err());
    }

    #[test]
    fn test_parse_timestamp_seconds_scaled_to_millis() {
        let from_secs = parse_timestamp("1705312800").unwrap();
        let from_millis = parse_timestamp("1705312800000").unwrap();
        assert_eq!(from_secs, from_millis);
    }

    #[test]
    fn test_missing_root_rejected() {
        assert!(CsvPriceSource::new("/definitely/not/here").is_err());
    }
}
