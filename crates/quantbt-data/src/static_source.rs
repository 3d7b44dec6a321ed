//! In-memory price provider for fixtures and tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use quantbt_core::error::DataError;
use quantbt_core::traits::PriceProvider;
use quantbt_core::types::Bar;

use crate::day_range_ms;

/// Provider serving preloaded bar vectors keyed by symbol.
#[derive(Debug, Default)]
pub struct StaticProvider {
    series: HashMap<String, Vec<Bar>>,
}

impl StaticProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bars for a symbol, replacing any previous entry.
    pub fn insert(&mut self, symbol: impl Into<String>, bars: Vec<Bar>) {
        self.series.insert(symbol.into(), bars);
    }

    /// Symbols currently registered.
    pub fn symbols(&self) -> Vec<&String> {
        self.series.keys().collect()
    }
}

#[async_trait]
impl PriceProvider for StaticProvider {
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let bars = self
            .series
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

        let (start_ms, end_ms) = day_range_ms(start, end);
        Ok(bars
            .iter()
            .filter(|b| b.timestamp >= start_ms && b.timestamp < end_ms)
            .copied()
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}
