//! Price series providers.
//!
//! The simulation core consumes [`quantbt_core::traits::PriceProvider`];
//! this crate supplies the file-backed implementation used by the CLI
//! and an in-memory one for fixtures and tests. Providers return bars
//! in chronological order without duplicate sessions, and consumers
//! still normalize defensively.

mod csv_source;
mod static_source;

pub use csv_source::CsvPriceSource;
pub use static_source::StaticProvider;

use chrono::NaiveDate;

/// Unix-millisecond bounds of an inclusive date range:
/// `[start 00:00, day after end 00:00)`.
pub(crate) fn day_range_ms(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    let start_ms = start
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp_millis();
    let end_exclusive = end.succ_opt().unwrap_or(end);
    let end_ms = end_exclusive
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp_millis();
    (start_ms, end_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_range_is_inclusive_of_end_date() {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap();
        let (start_ms, end_ms) = day_range_ms(start, end);

        assert_eq!(end_ms - start_ms, 2 * 86_400_000);
    }
}
