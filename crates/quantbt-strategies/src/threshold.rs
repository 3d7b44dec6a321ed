//! Threshold strategies: a fixed level arms the entry while flat and
//! the opposite level triggers the exit while long. The position state
//! machine provides the once-only behavior; a rule re-arms only after
//! its position is closed.

use quantbt_core::error::StrategyError;
use quantbt_core::traits::Indicator;
use quantbt_core::types::{Action, BarSeries, PositionState};
use quantbt_indicators::{Adx, Momentum, Rsi, Sma, Stochastic};
use serde::{Deserialize, Serialize};

/// RSI oversold/overbought reversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI calculation period
    pub period: usize,
    /// Buy below this level while flat
    pub oversold: f64,
    /// Close above this level while long
    pub overbought: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl RsiParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.period == 0 {
            return Err(StrategyError::InvalidConfig(
                "RSI period must be greater than 0".into(),
            ));
        }
        if self.overbought <= self.oversold {
            return Err(StrategyError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        if self.overbought > 100.0 || self.oversold < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "RSI thresholds must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.period + 1
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> RsiSeries {
        RsiSeries {
            params: self.clone(),
            rsi: Rsi::new(self.period).calculate(&series.closes()),
        }
    }
}

pub(crate) struct RsiSeries {
    params: RsiParams,
    rsi: Vec<f64>,
}

impl RsiSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let rsi = self.rsi[i];
        if rsi.is_nan() {
            return Action::Hold;
        }
        match state {
            PositionState::Flat if rsi < self.params.oversold => Action::Buy,
            PositionState::Long if rsi > self.params.overbought => Action::Close,
            _ => Action::Hold,
        }
    }
}

/// Slow stochastic %K reversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StochasticParams {
    /// %K lookback period
    pub k_period: usize,
    /// %D smoothing period
    pub d_period: usize,
    /// Buy below this %K level while flat
    pub oversold: f64,
    /// Close above this %K level while long
    pub overbought: f64,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
            oversold: 20.0,
            overbought: 80.0,
        }
    }
}

impl StochasticParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.k_period == 0 || self.d_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Stochastic periods must be greater than 0".into(),
            ));
        }
        if self.overbought <= self.oversold {
            return Err(StrategyError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> StochasticSeries {
        let outputs = Stochastic::with_periods(self.k_period, self.d_period)
            .calculate_ohlc(&series.highs(), &series.lows(), &series.closes());
        StochasticSeries {
            params: self.clone(),
            percent_k: outputs.iter().map(|o| o.k).collect(),
        }
    }
}

pub(crate) struct StochasticSeries {
    params: StochasticParams,
    percent_k: Vec<f64>,
}

impl StochasticSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let k = self.percent_k[i];
        if k.is_nan() {
            return Action::Hold;
        }
        match state {
            PositionState::Flat if k < self.params.oversold => Action::Buy,
            PositionState::Long if k > self.params.overbought => Action::Close,
            _ => Action::Hold,
        }
    }
}

/// ADX trend-strength gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdxParams {
    /// ADX smoothing period
    pub period: usize,
    /// Buy above this ADX level while flat
    pub entry_level: f64,
    /// Close below this ADX level while long
    pub exit_level: f64,
}

impl Default for AdxParams {
    fn default() -> Self {
        Self {
            period: 14,
            entry_level: 25.0,
            exit_level: 20.0,
        }
    }
}

impl AdxParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.period == 0 {
            return Err(StrategyError::InvalidConfig(
                "ADX period must be greater than 0".into(),
            ));
        }
        if self.exit_level >= self.entry_level {
            return Err(StrategyError::InvalidConfig(
                "Exit level must be below entry level".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        2 * self.period
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> AdxSeries {
        AdxSeries {
            params: self.clone(),
            adx: Adx::new(self.period).calculate_ohlc(
                &series.highs(),
                &series.lows(),
                &series.closes(),
            ),
        }
    }
}

pub(crate) struct AdxSeries {
    params: AdxParams,
    adx: Vec<f64>,
}

impl AdxSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let adx = self.adx[i];
        if adx.is_nan() {
            return Action::Hold;
        }
        match state {
            PositionState::Flat if adx > self.params.entry_level => Action::Buy,
            PositionState::Long if adx < self.params.exit_level => Action::Close,
            _ => Action::Hold,
        }
    }
}

/// Momentum sign rule: long while the close sits above its level
/// `period` bars back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumParams {
    /// Lookback period
    pub period: usize,
}

impl Default for MomentumParams {
    fn default() -> Self {
        Self { period: 10 }
    }
}

impl MomentumParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Momentum period must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.period + 1
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> MomentumSeries {
        MomentumSeries {
            momentum: Momentum::new(self.period).calculate(&series.closes()),
        }
    }
}

pub(crate) struct MomentumSeries {
    momentum: Vec<f64>,
}

impl MomentumSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let momentum = self.momentum[i];
        if momentum.is_nan() {
            return Action::Hold;
        }
        match state {
            PositionState::Flat if momentum > 0.0 => Action::Buy,
            PositionState::Long if momentum < 0.0 => Action::Close,
            _ => Action::Hold,
        }
    }
}

/// Close versus its own moving average.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmaTrendParams {
    /// Moving average period
    pub period: usize,
}

impl Default for SmaTrendParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl SmaTrendParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.period == 0 {
            return Err(StrategyError::InvalidConfig(
                "SMA period must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.period
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> SmaTrendSeries {
        let closes = series.closes();
        SmaTrendSeries {
            sma: Sma::new(self.period).calculate(&closes),
            closes,
        }
    }
}

pub(crate) struct SmaTrendSeries {
    sma: Vec<f64>,
    closes: Vec<f64>,
}

impl SmaTrendSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let sma = self.sma[i];
        if sma.is_nan() {
            return Action::Hold;
        }
        let close = self.closes[i];
        match state {
            PositionState::Flat if close > sma => Action::Buy,
            PositionState::Long if close < sma => Action::Close,
            _ => Action::Hold,
        }
    }
}
