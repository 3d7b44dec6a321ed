//! Moving-average and MACD crossover strategies.
//!
//! A crossover fires exactly once, at the bar where the sign of
//! `fast - slow` flips, not on every bar the fast line sits above the
//! slow one.

use quantbt_core::error::StrategyError;
use quantbt_core::traits::{Indicator, MultiOutputIndicator};
use quantbt_core::types::{Action, BarSeries, PositionState};
use quantbt_indicators::{Ema, Macd, Sma};
use serde::{Deserialize, Serialize};

/// Detect a crossover between two line series at bar `i`.
/// Returns Hold while either line is still warming up.
fn crossover_decision(
    fast: &[f64],
    slow: &[f64],
    i: usize,
    state: PositionState,
) -> Action {
    if i == 0 {
        return Action::Hold;
    }
    let (f, s) = (fast[i], slow[i]);
    let (pf, ps) = (fast[i - 1], slow[i - 1]);
    if f.is_nan() || s.is_nan() || pf.is_nan() || ps.is_nan() {
        return Action::Hold;
    }

    match state {
        PositionState::Flat if pf <= ps && f > s => Action::Buy,
        PositionState::Long if pf >= ps && f < s => Action::Close,
        _ => Action::Hold,
    }
}

/// Simple moving average crossover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmaCrossParams {
    /// Fast moving average period
    pub fast_period: usize,
    /// Slow moving average period
    pub slow_period: usize,
}

impl Default for SmaCrossParams {
    fn default() -> Self {
        Self {
            fast_period: 10,
            slow_period: 30,
        }
    }
}

impl SmaCrossParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.slow_period + 1
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> SmaCrossSeries {
        let closes = series.closes();
        SmaCrossSeries {
            fast: Sma::new(self.fast_period).calculate(&closes),
            slow: Sma::new(self.slow_period).calculate(&closes),
        }
    }
}

pub(crate) struct SmaCrossSeries {
    fast: Vec<f64>,
    slow: Vec<f64>,
}

impl SmaCrossSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        crossover_decision(&self.fast, &self.slow, i, state)
    }
}

/// Exponential moving average crossover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmaCrossParams {
    /// Fast EMA period
    pub fast_period: usize,
    /// Slow EMA period
    pub slow_period: usize,
}

impl Default for EmaCrossParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
        }
    }
}

impl EmaCrossParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.slow_period + 1
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> EmaCrossSeries {
        let closes = series.closes();
        EmaCrossSeries {
            fast: Ema::new(self.fast_period).calculate(&closes),
            slow: Ema::new(self.slow_period).calculate(&closes),
        }
    }
}

pub(crate) struct EmaCrossSeries {
    fast: Vec<f64>,
    slow: Vec<f64>,
}

impl EmaCrossSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        crossover_decision(&self.fast, &self.slow, i, state)
    }
}

/// MACD line / signal line crossover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdCrossParams {
    /// Fast EMA period
    pub fast_period: usize,
    /// Slow EMA period
    pub slow_period: usize,
    /// Signal EMA period
    pub signal_period: usize,
}

impl Default for MacdCrossParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl MacdCrossParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 || self.signal_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Periods must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.slow_period + self.signal_period
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> MacdCrossSeries {
        let closes = series.closes();
        let outputs = Macd::with_periods(self.fast_period, self.slow_period, self.signal_period)
            .calculate(&closes);
        MacdCrossSeries {
            macd: outputs.iter().map(|o| o.macd).collect(),
            signal: outputs.iter().map(|o| o.signal).collect(),
        }
    }
}

pub(crate) struct MacdCrossSeries {
    macd: Vec<f64>,
    signal: Vec<f64>,
}

impl MacdCrossSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        crossover_decision(&self.macd, &self.signal, i, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantbt_core::types::Bar;

    fn series_from_closes(prices: &[f64]) -> BarSeries {
        let mut series = BarSeries::new("TEST".to_string());
        for (i, &price) in prices.iter().enumerate() {
            series.push(Bar::new(
                i as i64 * 86_400_000,
                price,
                price + 1.0,
                price - 1.0,
                price,
                1000.0,
            ));
        }
        series
    }

    #[test]
    fn test_params_validation() {
        assert!(SmaCrossParams::default().validate().is_ok());
        assert!(SmaCrossParams {
            fast_period: 30,
            slow_period: 20
        }
        .validate()
        .is_err());
        assert!(EmaCrossParams {
            fast_period: 0,
            slow_period: 20
        }
        .validate()
        .is_err());
        assert!(MacdCrossParams::default().validate().is_ok());
    }

    #[test]
    fn test_sma_cross_fires_once_per_flip() {
        let params = SmaCrossParams {
            fast_period: 2,
            slow_period: 4,
        };
        // Downtrend then a sustained uptrend: exactly one bullish flip
        let prices = vec![
            110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 103.0, 107.0, 112.0, 118.0, 124.0,
        ];
        let series = series_from_closes(&prices);
        let compiled = params.compile(&series);

        let buys: Vec<usize> = (0..prices.len())
            .filter(|&i| compiled.decide(i, PositionState::Flat) == Action::Buy)
            .collect();
        assert_eq!(buys.len(), 1, "expected a single bullish crossover");

        // After the flip the fast stays above the slow: no further signal
        let flip = buys[0];
        for i in (flip + 1)..prices.len() {
            assert_eq!(compiled.decide(i, PositionState::Flat), Action::Hold);
        }
    }

    #[test]
    fn test_sma_cross_no_signal_on_flat_series() {
        let params = SmaCrossParams {
            fast_period: 10,
            slow_period: 30,
        };
        let prices = vec![100.0; 50];
        let series = series_from_closes(&prices);
        let compiled = params.compile(&series);

        for i in 0..50 {
            assert_eq!(compiled.decide(i, PositionState::Flat), Action::Hold);
            assert_eq!(compiled.decide(i, PositionState::Long), Action::Hold);
        }
    }

    #[test]
    fn test_crossover_respects_position_state() {
        let params = SmaCrossParams {
            fast_period: 2,
            slow_period: 4,
        };
        let prices = vec![
            110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 103.0, 107.0, 112.0, 118.0,
        ];
        let series = series_from_closes(&prices);
        let compiled = params.compile(&series);

        for i in 0..prices.len() {
            // A bullish flip while long must not propose another Buy
            assert_ne!(compiled.decide(i, PositionState::Long), Action::Buy);
            // A bearish flip while flat must not propose a Close
            assert_ne!(compiled.decide(i, PositionState::Flat), Action::Close);
        }
    }

    #[test]
    fn test_ema_cross_bearish_flip_closes() {
        let params = EmaCrossParams {
            fast_period: 2,
            slow_period: 5,
        };
        // Uptrend rolling over into a decline
        let prices = vec![
            100.0, 104.0, 108.0, 112.0, 116.0, 120.0, 118.0, 112.0, 105.0, 98.0, 92.0,
        ];
        let series = series_from_closes(&prices);
        let compiled = params.compile(&series);

        let closes: Vec<usize> = (0..prices.len())
            .filter(|&i| compiled.decide(i, PositionState::Long) == Action::Close)
            .collect();
        assert_eq!(closes.len(), 1, "expected a single bearish crossover");
    }

    #[test]
    fn test_macd_cross_uses_sign_flip() {
        let params = MacdCrossParams {
            fast_period: 3,
            slow_period: 6,
            signal_period: 3,
        };
        // V-shaped series: decline then recovery forces a MACD flip
        let mut prices: Vec<f64> = (0..15).map(|i| 130.0 - i as f64 * 2.0).collect();
        prices.extend((0..15).map(|i| 102.0 + i as f64 * 3.0));
        let series = series_from_closes(&prices);
        let compiled = params.compile(&series);

        let buys: Vec<usize> = (0..prices.len())
            .filter(|&i| compiled.decide(i, PositionState::Flat) == Action::Buy)
            .collect();
        assert!(!buys.is_empty(), "recovery should produce a bullish flip");
    }
}
