//! Price series provider trait.

use crate::error::DataError;
use crate::types::Bar;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Trait for historical price providers.
///
/// Implementations must return bars in chronological order with no
/// duplicate sessions; callers still normalize defensively before
/// simulating.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch daily bars for a symbol over a date range (inclusive).
    ///
    /// Returns [`DataError::NoDataAvailable`] when the symbol has no
    /// bars in the range.
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}
