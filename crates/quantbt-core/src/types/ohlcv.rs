//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Compact OHLCV bar for one trading session.
/// Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Calculate the bar's range (high - low).
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp)
            .unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
    }
}

/// Time-series container for the bars of one symbol.
///
/// Bars are kept in chronological order with no duplicate timestamps;
/// `sort_and_dedup` restores the invariant for providers that cannot
/// guarantee it.
#[derive(Debug, Clone)]
pub struct BarSeries {
    /// Symbol identifier
    pub symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Create a new empty bar series.
    pub fn new(symbol: String) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
        }
    }

    /// Create a series from a vector of bars, sorting and de-duplicating.
    pub fn from_bars(symbol: String, bars: Vec<Bar>) -> Self {
        let mut series = Self { symbol, bars };
        series.sort_and_dedup();
        series
    }

    /// Push a new bar.
    pub fn push(&mut self, bar: Bar) {
        self.bars.push(bar);
    }

    /// Push multiple bars.
    pub fn extend(&mut self, bars: impl IntoIterator<Item = Bar>) {
        self.bars.extend(bars);
    }

    /// Restore chronological order and drop duplicate sessions.
    /// The first bar seen for a timestamp wins.
    pub fn sort_and_dedup(&mut self) {
        self.bars.sort_by_key(|b| b.timestamp);
        self.bars.dedup_by_key(|b| b.timestamp);
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get all bars as a slice.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Get the last bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Get a bar by index (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Extract high prices as a vector.
    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// Extract low prices as a vector.
    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// Extract volumes as a vector.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Get an iterator over the bars.
    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }
}

impl FromIterator<Bar> for BarSeries {
    fn from_iter<T: IntoIterator<Item = Bar>>(iter: T) -> Self {
        Self {
            symbol: String::new(),
            bars: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_calculations() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1000000.0);

        assert!((bar.range() - 15.0).abs() < 0.001);
        assert_eq!(bar.datetime().timestamp_millis(), 1000);
    }

    #[test]
    fn test_series_sort_and_dedup() {
        let bars = vec![
            Bar::new(3, 102.0, 103.0, 101.0, 102.5, 1000.0),
            Bar::new(1, 100.0, 101.0, 99.0, 100.5, 1000.0),
            Bar::new(3, 999.0, 999.0, 999.0, 999.0, 0.0),
            Bar::new(2, 100.5, 102.0, 100.0, 101.5, 1000.0),
        ];
        let series = BarSeries::from_bars("PETR4".to_string(), bars);

        assert_eq!(series.len(), 3);
        assert_eq!(series.get(0).unwrap().timestamp, 1);
        assert_eq!(series.get(2).unwrap().timestamp, 3);
        // First occurrence of the duplicate timestamp wins
        assert_eq!(series.get(2).unwrap().close, 102.5);
    }

    #[test]
    fn test_series_extractions() {
        let mut series = BarSeries::new("PETR4".to_string());
        series.push(Bar::new(1, 100.0, 101.0, 99.0, 100.5, 1000.0));
        series.push(Bar::new(2, 100.5, 102.0, 100.0, 101.5, 2000.0));

        assert_eq!(series.closes(), vec![100.5, 101.5]);
        assert_eq!(series.highs(), vec![101.0, 102.0]);
        assert_eq!(series.lows(), vec![99.0, 100.0]);
        assert_eq!(series.volumes(), vec![1000.0, 2000.0]);
    }
}
