//! Strategy registry: static identifier-to-variant mapping.
//!
//! Identifiers resolve to a variant and a default parameter set at
//! configuration time; an unknown identifier is rejected before any
//! simulation starts. Several identifiers share a variant with
//! different defaults (e.g. `rsi` and `rsi2`) since parameters are part
//! of a strategy's identity.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use quantbt_core::error::StrategyError;

use crate::channel::{BollingerParams, DonchianParams, IchimokuParams, ZScoreParams};
use crate::combo::{
    AdxTrendParams, BollingerVolumeParams, MaRsiParams, MaVolatilityParams, RsiMacdParams,
};
use crate::crossover::{EmaCrossParams, MacdCrossParams, SmaCrossParams};
use crate::strategy::Strategy;
use crate::threshold::{AdxParams, MomentumParams, RsiParams, SmaTrendParams, StochasticParams};
use crate::trailing::MomentumTrailingParams;

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Registry identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Default parameters as JSON
    pub default_params: Value,
}

/// Registry of available strategies.
pub struct StrategyRegistry {
    strategies: HashMap<String, StrategyInfo>,
}

fn parse<T: DeserializeOwned>(params: Value) -> Result<T, StrategyError> {
    serde_json::from_value(params).map_err(|e| StrategyError::InvalidConfig(e.to_string()))
}

impl StrategyRegistry {
    /// Create a registry with all built-in strategies.
    pub fn new() -> Self {
        let mut strategies = HashMap::new();

        let mut register = |id: &str, name: &str, description: &str, default_params: Value| {
            strategies.insert(
                id.to_string(),
                StrategyInfo {
                    id: id.to_string(),
                    name: name.to_string(),
                    description: description.to_string(),
                    default_params,
                },
            );
        };

        register(
            "sma_cross",
            "SMA Crossover 10/30",
            "Buys when the fast SMA crosses above the slow SMA, closes on the opposite cross",
            serde_json::to_value(SmaCrossParams::default()).unwrap(),
        );
        register(
            "sma_cross_20_50",
            "SMA Crossover 20/50",
            "Slower SMA crossover pair for position trading",
            serde_json::to_value(SmaCrossParams {
                fast_period: 20,
                slow_period: 50,
            })
            .unwrap(),
        );
        register(
            "ema_cross",
            "EMA Crossover 12/26",
            "Buys when the fast EMA crosses above the slow EMA, closes on the opposite cross",
            serde_json::to_value(EmaCrossParams::default()).unwrap(),
        );
        register(
            "macd_cross",
            "MACD Crossover",
            "Trades MACD line / signal line crossovers",
            serde_json::to_value(MacdCrossParams::default()).unwrap(),
        );
        register(
            "sma_trend",
            "SMA Trend",
            "Long while the close holds above its moving average",
            serde_json::to_value(SmaTrendParams::default()).unwrap(),
        );
        register(
            "rsi",
            "RSI 30/70",
            "Buys oversold RSI readings, closes overbought ones",
            serde_json::to_value(RsiParams::default()).unwrap(),
        );
        register(
            "rsi2",
            "RSI-2 10/90",
            "Short-term RSI(2) mean reversion with extreme thresholds",
            serde_json::to_value(RsiParams {
                period: 2,
                oversold: 10.0,
                overbought: 90.0,
            })
            .unwrap(),
        );
        register(
            "stochastic",
            "Slow Stochastic",
            "Buys %K under the oversold level, closes over the overbought level",
            serde_json::to_value(StochasticParams::default()).unwrap(),
        );
        register(
            "bollinger",
            "Bollinger Bands",
            "Buys a lower-band touch, closes an upper-band touch",
            serde_json::to_value(BollingerParams::default()).unwrap(),
        );
        register(
            "bollinger_volume",
            "Bollinger + Volume",
            "Lower-band touch confirmed by above-average volume, exit at the middle band",
            serde_json::to_value(BollingerVolumeParams::default()).unwrap(),
        );
        register(
            "adx",
            "ADX Strength",
            "Buys strong trends (ADX over 25), closes when strength fades",
            serde_json::to_value(AdxParams::default()).unwrap(),
        );
        register(
            "adx_trend",
            "ADX + Trend Filter",
            "ADX strength gate with a moving-average direction filter",
            serde_json::to_value(AdxTrendParams::default()).unwrap(),
        );
        register(
            "momentum",
            "Momentum",
            "Long while the close sits above its level ten bars back",
            serde_json::to_value(MomentumParams::default()).unwrap(),
        );
        register(
            "momentum_trailing",
            "Momentum + Brackets",
            "Rate-of-change entry with stop-loss and take-profit bands",
            serde_json::to_value(MomentumTrailingParams::default()).unwrap(),
        );
        register(
            "donchian",
            "Donchian Breakout",
            "Buys a close above the prior channel high, exits under the channel low",
            serde_json::to_value(DonchianParams::default()).unwrap(),
        );
        register(
            "ichimoku",
            "Ichimoku Cloud",
            "Long above leading span A, out below leading span B",
            serde_json::to_value(IchimokuParams::default()).unwrap(),
        );
        register(
            "ma_rsi",
            "MA + RSI",
            "Buys RSI dips inside a moving-average uptrend",
            serde_json::to_value(MaRsiParams::default()).unwrap(),
        );
        register(
            "rsi_macd",
            "RSI + MACD",
            "Buys oversold RSI confirmed by a positive MACD spread",
            serde_json::to_value(RsiMacdParams::default()).unwrap(),
        );
        register(
            "zscore",
            "Z-Score Reversion",
            "Buys deep discounts to the EMA, closes at the mean",
            serde_json::to_value(ZScoreParams::default()).unwrap(),
        );
        register(
            "ma_volatility",
            "MA + Volatility",
            "Moving-average spread gated by realized volatility",
            serde_json::to_value(MaVolatilityParams::default()).unwrap(),
        );

        Self { strategies }
    }

    /// List all available strategies, sorted by identifier.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        let mut infos: Vec<&StrategyInfo> = self.strategies.values().collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    /// Get strategy info by identifier.
    pub fn get(&self, id: &str) -> Option<&StrategyInfo> {
        self.strategies.get(id)
    }

    /// Check if a strategy identifier exists.
    pub fn exists(&self, id: &str) -> bool {
        self.strategies.contains_key(id)
    }

    /// Create a strategy from a full parameter document.
    pub fn create(&self, id: &str, params: Value) -> Result<Strategy, StrategyError> {
        let strategy = match id {
            "sma_cross" | "sma_cross_20_50" => Strategy::SmaCross(parse(params)?),
            "ema_cross" => Strategy::EmaCross(parse(params)?),
            "macd_cross" => Strategy::MacdCross(parse(params)?),
            "sma_trend" => Strategy::SmaTrend(parse(params)?),
            "rsi" | "rsi2" => Strategy::Rsi(parse(params)?),
            "stochastic" => Strategy::Stochastic(parse(params)?),
            "bollinger" => Strategy::Bollinger(parse(params)?),
            "bollinger_volume" => Strategy::BollingerVolume(parse(params)?),
            "adx" => Strategy::Adx(parse(params)?),
            "adx_trend" => Strategy::AdxTrend(parse(params)?),
            "momentum" => Strategy::Momentum(parse(params)?),
            "momentum_trailing" => Strategy::MomentumTrailing(parse(params)?),
            "donchian" => Strategy::Donchian(parse(params)?),
            "ichimoku" => Strategy::Ichimoku(parse(params)?),
            "ma_rsi" => Strategy::MaRsi(parse(params)?),
            "rsi_macd" => Strategy::RsiMacd(parse(params)?),
            "zscore" => Strategy::ZScore(parse(params)?),
            "ma_volatility" => Strategy::MaVolatility(parse(params)?),
            _ => return Err(StrategyError::NotFound(id.to_string())),
        };

        strategy.validate()?;
        debug!(id, kind = strategy.kind(), "strategy created");
        Ok(strategy)
    }

    /// Create a strategy with its registered default parameters.
    pub fn create_default(&self, id: &str) -> Result<Strategy, StrategyError> {
        let info = self
            .get(id)
            .ok_or_else(|| StrategyError::NotFound(id.to_string()))?;
        self.create(id, info.default_params.clone())
    }

    /// Create a strategy with a partial parameter override on top of
    /// the registered defaults.
    pub fn create_with_overrides(
        &self,
        id: &str,
        overrides: &Value,
    ) -> Result<Strategy, StrategyError> {
        let info = self
            .get(id)
            .ok_or_else(|| StrategyError::NotFound(id.to_string()))?;

        let mut params = info.default_params.clone();
        match (&mut params, overrides) {
            (Value::Object(base), Value::Object(over)) => {
                for (key, value) in over {
                    if !base.contains_key(key) {
                        return Err(StrategyError::InvalidConfig(format!(
                            "unknown parameter '{}' for strategy '{}'",
                            key, id
                        )));
                    }
                    base.insert(key.clone(), value.clone());
                }
            }
            _ => {
                return Err(StrategyError::InvalidConfig(format!(
                    "parameters for strategy '{}' must be a table",
                    id
                )))
            }
        }

        self.create(id, params)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lists_all_ids() {
        let registry = StrategyRegistry::new();
        let infos = registry.list();

        assert_eq!(infos.len(), 20);
        // Sorted by identifier
        for pair in infos.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
    }

    #[test]
    fn test_registry_get() {
        let registry = StrategyRegistry::new();

        assert!(registry.get("sma_cross").is_some());
        assert!(registry.get("unknown").is_none());
        assert!(registry.exists("donchian"));
    }

    #[test]
    fn test_create_default_every_entry() {
        let registry = StrategyRegistry::new();

        for info in registry.list() {
            let strategy = registry.create_default(&info.id);
            assert!(strategy.is_ok(), "default for '{}' must build", info.id);
        }
    }

    #[test]
    fn test_shared_variant_distinct_defaults() {
        let registry = StrategyRegistry::new();

        let rsi = registry.create_default("rsi").unwrap();
        let rsi2 = registry.create_default("rsi2").unwrap();

        match (rsi, rsi2) {
            (Strategy::Rsi(a), Strategy::Rsi(b)) => {
                assert_eq!(a.period, 14);
                assert_eq!(b.period, 2);
                assert!((b.oversold - 10.0).abs() < 1e-12);
            }
            _ => panic!("rsi ids must map to the RSI variant"),
        }
    }

    #[test]
    fn test_create_unknown_strategy() {
        let registry = StrategyRegistry::new();

        let result = registry.create_default("unknown");
        assert!(matches!(result, Err(StrategyError::NotFound(_))));
    }

    #[test]
    fn test_create_with_overrides() {
        let registry = StrategyRegistry::new();

        let strategy = registry
            .create_with_overrides("rsi", &serde_json::json!({ "period": 7 }))
            .unwrap();
        match strategy {
            Strategy::Rsi(params) => {
                assert_eq!(params.period, 7);
                // Untouched fields keep their defaults
                assert!((params.oversold - 30.0).abs() < 1e-12);
            }
            _ => panic!("expected RSI variant"),
        }
    }

    #[test]
    fn test_overrides_reject_unknown_keys() {
        let registry = StrategyRegistry::new();

        let result =
            registry.create_with_overrides("rsi", &serde_json::json!({ "perod": 7 }));
        assert!(matches!(result, Err(StrategyError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_override_values_rejected() {
        let registry = StrategyRegistry::new();

        // Inverted thresholds fail validation, not simulation
        let result = registry.create_with_overrides(
            "rsi",
            &serde_json::json!({ "oversold": 80.0, "overbought": 20.0 }),
        );
        assert!(matches!(result, Err(StrategyError::InvalidConfig(_))));
    }
}
