//! Configuration structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use quantbt_core::types::SizingPolicy;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backtest: BacktestSettings,
    /// Per-strategy parameter overrides keyed by registry identifier.
    /// Unset strategies run with their registered defaults.
    #[serde(default)]
    pub strategies: HashMap<String, Value>,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "quantbt".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Backtest settings consumed by the simulation loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSettings {
    /// Starting cash per (symbol, strategy) run
    pub starting_cash: Decimal,
    /// Commission as a fraction of traded value per fill
    pub commission_rate: Decimal,
    /// Position sizing policy
    pub sizing: SizingPolicy,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            starting_cash: dec!(100000),
            commission_rate: dec!(0.001),
            sizing: SizingPolicy::PercentOfEquity { percent: dec!(95) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.backtest.starting_cash, dec!(100000));
        assert_eq!(config.backtest.commission_rate, dec!(0.001));
        assert!(config.strategies.is_empty());
    }

    #[test]
    fn test_parse_full_document() {
        let config = crate::parse_config(
            r#"
            [app]
            name = "quantbt"
            environment = "test"

            [logging]
            level = "debug"
            format = "json"

            [backtest]
            starting_cash = 10000
            commission_rate = 0.0

            [backtest.sizing]
            policy = "full_cash"

            [strategies.rsi]
            period = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.app.environment, "test");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.backtest.starting_cash, dec!(10000));
        assert_eq!(config.backtest.sizing, SizingPolicy::FullCash);
        assert_eq!(config.strategies["rsi"]["period"], 7);
    }

    #[test]
    fn test_parse_percent_sizing() {
        let config = crate::parse_config(
            r#"
            [backtest]
            starting_cash = 100000
            commission_rate = 0.001

            [backtest.sizing]
            policy = "percent_of_equity"
            percent = 95
            "#,
        )
        .unwrap();

        assert_eq!(
            config.backtest.sizing,
            SizingPolicy::PercentOfEquity { percent: dec!(95) }
        );
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config = crate::parse_config("").unwrap();
        assert_eq!(config.app.name, "quantbt");
        assert_eq!(config.logging.format, "pretty");
    }
}
