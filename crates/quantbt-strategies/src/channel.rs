//! Band and channel strategies: entries on a band touch or breakout,
//! exits on the opposite band or a mean reversion target.

use quantbt_core::error::StrategyError;
use quantbt_core::traits::{Indicator, MultiOutputIndicator};
use quantbt_core::types::{Action, BarSeries, PositionState};
use quantbt_indicators::{BollingerBands, DonchianChannel, Ema, Ichimoku, StdDev};
use serde::{Deserialize, Serialize};

/// Bollinger Band reversal: buy a lower-band touch, close an
/// upper-band touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerParams {
    /// Band lookback period
    pub period: usize,
    /// Width of the bands in standard deviations
    pub std_dev_multiplier: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 {
            return Err(StrategyError::InvalidConfig(
                "Bollinger period must be at least 2".into(),
            ));
        }
        if self.std_dev_multiplier <= 0.0 {
            return Err(StrategyError::InvalidConfig(
                "Band width must be positive".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.period
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> BollingerSeries {
        let closes = series.closes();
        let bands = BollingerBands::with_params(self.period, self.std_dev_multiplier)
            .calculate(&closes);
        BollingerSeries {
            upper: bands.iter().map(|b| b.upper).collect(),
            lower: bands.iter().map(|b| b.lower).collect(),
            closes,
        }
    }
}

pub(crate) struct BollingerSeries {
    upper: Vec<f64>,
    lower: Vec<f64>,
    closes: Vec<f64>,
}

impl BollingerSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        if self.lower[i].is_nan() {
            return Action::Hold;
        }
        let close = self.closes[i];
        match state {
            PositionState::Flat if close < self.lower[i] => Action::Buy,
            PositionState::Long if close > self.upper[i] => Action::Close,
            _ => Action::Hold,
        }
    }
}

/// Donchian breakout: buy when the close clears the previous bar's
/// channel high, close when it loses the previous bar's channel low.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonchianParams {
    /// Channel lookback period
    pub period: usize,
}

impl Default for DonchianParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl DonchianParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Donchian period must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.period + 1
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> DonchianSeries {
        let channel =
            DonchianChannel::new(self.period).calculate_ohlc(&series.highs(), &series.lows());
        DonchianSeries {
            upper: channel.iter().map(|c| c.upper).collect(),
            lower: channel.iter().map(|c| c.lower).collect(),
            closes: series.closes(),
        }
    }
}

pub(crate) struct DonchianSeries {
    upper: Vec<f64>,
    lower: Vec<f64>,
    closes: Vec<f64>,
}

impl DonchianSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        // Breakout is measured against the channel as it stood one bar
        // earlier, otherwise the current high would mask the signal.
        if i == 0 {
            return Action::Hold;
        }
        let (upper, lower) = (self.upper[i - 1], self.lower[i - 1]);
        if upper.is_nan() {
            return Action::Hold;
        }
        let close = self.closes[i];
        match state {
            PositionState::Flat if close > upper => Action::Buy,
            PositionState::Long if close < lower => Action::Close,
            _ => Action::Hold,
        }
    }
}

/// Ichimoku cloud filter: long above span A, out below span B.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IchimokuParams {
    /// Conversion line period
    pub tenkan_period: usize,
    /// Base line period (also the forward displacement)
    pub kijun_period: usize,
    /// Leading span B period
    pub senkou_b_period: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan_period: 9,
            kijun_period: 26,
            senkou_b_period: 52,
        }
    }
}

impl IchimokuParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.tenkan_period == 0 || self.kijun_period == 0 || self.senkou_b_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Ichimoku periods must be greater than 0".into(),
            ));
        }
        if self.tenkan_period >= self.kijun_period
            || self.kijun_period >= self.senkou_b_period
        {
            return Err(StrategyError::InvalidConfig(
                "Ichimoku periods must be strictly increasing".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.senkou_b_period + self.kijun_period
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> IchimokuSeries {
        let lines = Ichimoku::with_periods(
            self.tenkan_period,
            self.kijun_period,
            self.senkou_b_period,
        )
        .calculate_ohlc(&series.highs(), &series.lows());
        IchimokuSeries {
            senkou_a: lines.iter().map(|l| l.senkou_a).collect(),
            senkou_b: lines.iter().map(|l| l.senkou_b).collect(),
            closes: series.closes(),
        }
    }
}

pub(crate) struct IchimokuSeries {
    senkou_a: Vec<f64>,
    senkou_b: Vec<f64>,
    closes: Vec<f64>,
}

impl IchimokuSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let (span_a, span_b) = (self.senkou_a[i], self.senkou_b[i]);
        if span_a.is_nan() || span_b.is_nan() {
            return Action::Hold;
        }
        let close = self.closes[i];
        match state {
            PositionState::Flat if close > span_a => Action::Buy,
            PositionState::Long if close < span_b => Action::Close,
            _ => Action::Hold,
        }
    }
}

/// Z-score mean reversion: buy a deep discount to the EMA, close once
/// the close is back at or above it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZScoreParams {
    /// EMA and standard deviation period
    pub period: usize,
    /// Buy when the z-score drops below this (negative) level
    pub entry_z: f64,
    /// Close when the z-score rises above this level
    pub exit_z: f64,
}

impl Default for ZScoreParams {
    fn default() -> Self {
        Self {
            period: 20,
            entry_z: -2.0,
            exit_z: 0.0,
        }
    }
}

impl ZScoreParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 {
            return Err(StrategyError::InvalidConfig(
                "Z-score period must be at least 2".into(),
            ));
        }
        if self.entry_z >= self.exit_z {
            return Err(StrategyError::InvalidConfig(
                "Entry z must be below exit z".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.period
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> ZScoreSeries {
        let closes = series.closes();
        ZScoreSeries {
            params: self.clone(),
            ema: Ema::new(self.period).calculate(&closes),
            std_dev: StdDev::new(self.period).calculate(&closes),
            closes,
        }
    }
}

pub(crate) struct ZScoreSeries {
    params: ZScoreParams,
    ema: Vec<f64>,
    std_dev: Vec<f64>,
    closes: Vec<f64>,
}

impl ZScoreSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let std_dev = self.std_dev[i];
        // A zero-dispersion window has no defined z-score
        if std_dev.is_nan() || std_dev == 0.0 {
            return Action::Hold;
        }
        let z = (self.closes[i] - self.ema[i]) / std_dev;
        match state {
            PositionState::Flat if z < self.params.entry_z => Action::Buy,
            PositionState::Long if z > self.params.exit_z => Action::Close,
            _ => Action::Hold,
        }
    }
}
