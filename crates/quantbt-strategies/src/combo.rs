//! Multi-indicator strategies: one indicator gates the other.

use quantbt_core::error::StrategyError;
use quantbt_core::traits::{Indicator, MultiOutputIndicator};
use quantbt_core::types::{Action, BarSeries, PositionState};
use quantbt_indicators::{Adx, BollingerBands, Macd, Rsi, Sma, StdDev};
use serde::{Deserialize, Serialize};

/// Trend filter plus RSI dip: buy pullbacks inside an uptrend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaRsiParams {
    /// Moving average period for the trend filter
    pub ma_period: usize,
    /// RSI period
    pub rsi_period: usize,
    /// Buy below this RSI level while flat
    pub oversold: f64,
    /// Close above this RSI level while long
    pub overbought: f64,
}

impl Default for MaRsiParams {
    fn default() -> Self {
        Self {
            ma_period: 14,
            rsi_period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl MaRsiParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.ma_period == 0 || self.rsi_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Periods must be greater than 0".into(),
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
        self.ma_period.max(self.rsi_period + 1)
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> MaRsiSeries {
        let closes = series.closes();
        MaRsiSeries {
            params: self.clone(),
            sma: Sma::new(self.ma_period).calculate(&closes),
            rsi: Rsi::new(self.rsi_period).calculate(&closes),
            closes,
        }
    }
}

pub(crate) struct MaRsiSeries {
    params: MaRsiParams,
    sma: Vec<f64>,
    rsi: Vec<f64>,
    closes: Vec<f64>,
}

impl MaRsiSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let (sma, rsi) = (self.sma[i], self.rsi[i]);
        if sma.is_nan() || rsi.is_nan() {
            return Action::Hold;
        }
        let close = self.closes[i];
        match state {
            PositionState::Flat if close > sma && rsi < self.params.oversold => Action::Buy,
            PositionState::Long if rsi > self.params.overbought => Action::Close,
            _ => Action::Hold,
        }
    }
}

/// RSI dip confirmed by a positive MACD spread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiMacdParams {
    /// RSI period
    pub rsi_period: usize,
    /// MACD fast EMA period
    pub fast_period: usize,
    /// MACD slow EMA period
    pub slow_period: usize,
    /// MACD signal EMA period
    pub signal_period: usize,
    /// Buy below this RSI level while flat
    pub oversold: f64,
    /// Close above this RSI level while long
    pub overbought: f64,
}

impl Default for RsiMacdParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl RsiMacdParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.rsi_period == 0 || self.fast_period == 0 || self.signal_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Periods must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
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
        (self.rsi_period + 1).max(self.slow_period + self.signal_period)
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> RsiMacdSeries {
        let closes = series.closes();
        let macd = Macd::with_periods(self.fast_period, self.slow_period, self.signal_period)
            .calculate(&closes);
        RsiMacdSeries {
            params: self.clone(),
            rsi: Rsi::new(self.rsi_period).calculate(&closes),
            histogram: macd.iter().map(|o| o.histogram).collect(),
        }
    }
}

pub(crate) struct RsiMacdSeries {
    params: RsiMacdParams,
    rsi: Vec<f64>,
    histogram: Vec<f64>,
}

impl RsiMacdSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let (rsi, histogram) = (self.rsi[i], self.histogram[i]);
        if rsi.is_nan() || histogram.is_nan() {
            return Action::Hold;
        }
        match state {
            PositionState::Flat if rsi < self.params.oversold && histogram > 0.0 => {
                Action::Buy
            }
            PositionState::Long if rsi > self.params.overbought => Action::Close,
            _ => Action::Hold,
        }
    }
}

/// Lower Bollinger touch confirmed by above-average volume; exit at
/// the middle band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerVolumeParams {
    /// Band lookback period
    pub period: usize,
    /// Width of the bands in standard deviations
    pub std_dev_multiplier: f64,
    /// Volume moving average period
    pub volume_period: usize,
}

impl Default for BollingerVolumeParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
            volume_period: 20,
        }
    }
}

impl BollingerVolumeParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 || self.volume_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Periods must be at least 2 (bands) and 1 (volume)".into(),
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
        self.period.max(self.volume_period)
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> BollingerVolumeSeries {
        let closes = series.closes();
        let volumes = series.volumes();
        let bands = BollingerBands::with_params(self.period, self.std_dev_multiplier)
            .calculate(&closes);
        BollingerVolumeSeries {
            lower: bands.iter().map(|b| b.lower).collect(),
            middle: bands.iter().map(|b| b.middle).collect(),
            volume_sma: Sma::new(self.volume_period).calculate(&volumes),
            closes,
            volumes,
        }
    }
}

pub(crate) struct BollingerVolumeSeries {
    lower: Vec<f64>,
    middle: Vec<f64>,
    volume_sma: Vec<f64>,
    closes: Vec<f64>,
    volumes: Vec<f64>,
}

impl BollingerVolumeSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let (lower, volume_sma) = (self.lower[i], self.volume_sma[i]);
        if lower.is_nan() || volume_sma.is_nan() {
            return Action::Hold;
        }
        let close = self.closes[i];
        match state {
            PositionState::Flat if close < lower && self.volumes[i] > volume_sma => {
                Action::Buy
            }
            PositionState::Long if close > self.middle[i] => Action::Close,
            _ => Action::Hold,
        }
    }
}

/// ADX strength gate on top of a moving-average trend filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdxTrendParams {
    /// ADX smoothing period
    pub adx_period: usize,
    /// Buy above this ADX level (with the trend filter) while flat
    pub entry_level: f64,
    /// Moving average period for the trend filter
    pub ma_period: usize,
}

impl Default for AdxTrendParams {
    fn default() -> Self {
        Self {
            adx_period: 14,
            entry_level: 25.0,
            ma_period: 20,
        }
    }
}

impl AdxTrendParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.adx_period == 0 || self.ma_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Periods must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        (2 * self.adx_period).max(self.ma_period)
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> AdxTrendSeries {
        let closes = series.closes();
        AdxTrendSeries {
            params: self.clone(),
            adx: Adx::new(self.adx_period).calculate_ohlc(
                &series.highs(),
                &series.lows(),
                &closes,
            ),
            sma: Sma::new(self.ma_period).calculate(&closes),
            closes,
        }
    }
}

pub(crate) struct AdxTrendSeries {
    params: AdxTrendParams,
    adx: Vec<f64>,
    sma: Vec<f64>,
    closes: Vec<f64>,
}

impl AdxTrendSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let (adx, sma) = (self.adx[i], self.sma[i]);
        if adx.is_nan() || sma.is_nan() {
            return Action::Hold;
        }
        let close = self.closes[i];
        match state {
            PositionState::Flat if adx > self.params.entry_level && close > sma => {
                Action::Buy
            }
            PositionState::Long if close < sma => Action::Close,
            _ => Action::Hold,
        }
    }
}

/// Moving-average spread gated by realized volatility of daily returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaVolatilityParams {
    /// Fast moving average period
    pub fast_period: usize,
    /// Slow moving average period
    pub slow_period: usize,
    /// Rolling window for the return standard deviation
    pub vol_period: usize,
    /// Minimum daily-return volatility required for an entry
    pub vol_threshold: f64,
}

impl Default for MaVolatilityParams {
    fn default() -> Self {
        Self {
            fast_period: 10,
            slow_period: 30,
            vol_period: 20,
            vol_threshold: 0.02,
        }
    }
}

impl MaVolatilityParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 || self.vol_period < 2 {
            return Err(StrategyError::InvalidConfig(
                "Periods must be greater than 0 (MA) and at least 2 (volatility)".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        if self.vol_threshold < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "Volatility threshold must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.slow_period.max(self.vol_period + 1)
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> MaVolatilitySeries {
        let closes = series.closes();

        // Daily returns, undefined at the first bar
        let mut returns = vec![f64::NAN; closes.len().min(1)];
        for i in 1..closes.len() {
            if closes[i - 1] != 0.0 {
                returns.push(closes[i] / closes[i - 1] - 1.0);
            } else {
                returns.push(f64::NAN);
            }
        }

        MaVolatilitySeries {
            params: self.clone(),
            fast: Sma::new(self.fast_period).calculate(&closes),
            slow: Sma::new(self.slow_period).calculate(&closes),
            volatility: StdDev::new(self.vol_period).calculate(&returns),
        }
    }
}

pub(crate) struct MaVolatilitySeries {
    params: MaVolatilityParams,
    fast: Vec<f64>,
    slow: Vec<f64>,
    volatility: Vec<f64>,
}

impl MaVolatilitySeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let (fast, slow) = (self.fast[i], self.slow[i]);
        if fast.is_nan() || slow.is_nan() {
            return Action::Hold;
        }
        match state {
            PositionState::Flat => {
                let volatility = self.volatility[i];
                if !volatility.is_nan()
                    && fast > slow
                    && volatility > self.params.vol_threshold
                {
                    Action::Buy
                } else {
                    Action::Hold
                }
            }
            PositionState::Long if fast < slow => Action::Close,
            _ => Action::Hold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantbt_core::types::Bar;

    fn series_with_volumes(prices: &[f64], volumes: &[f64]) -> BarSeries {
        let mut series = BarSeries::new("TEST".to_string());
        for (i, &price) in prices.iter().enumerate() {
            series.push(Bar::new(
                i as i64 * 86_400_000,
                price,
                price + 1.0,
                price - 1.0,
                price,
                volumes.get(i).copied().unwrap_or(1000.0),
            ));
        }
        series
    }

    fn series_from_closes(prices: &[f64]) -> BarSeries {
        series_with_volumes(prices, &[])
    }

    #[test]
    fn test_params_validation() {
        assert!(MaRsiParams::default().validate().is_ok());
        assert!(RsiMacdParams::default().validate().is_ok());
        assert!(BollingerVolumeParams::default().validate().is_ok());
        assert!(AdxTrendParams::default().validate().is_ok());
        assert!(MaVolatilityParams::default().validate().is_ok());

        assert!(MaRsiParams {
            oversold: 70.0,
            overbought: 30.0,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(MaVolatilityParams {
            fast_period: 30,
            slow_period: 10,
            ..Default::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_ma_rsi_requires_both_conditions() {
        let params = MaRsiParams {
            ma_period: 3,
            rsi_period: 3,
            oversold: 30.0,
            overbought: 70.0,
        };
        // Steady rally: close above the SMA but RSI pinned high
        let prices: Vec<f64> = (0..12).map(|i| 100.0 + i as f64 * 2.0).collect();
        let compiled = params.compile(&series_from_closes(&prices));

        for i in 0..prices.len() {
            assert_eq!(compiled.decide(i, PositionState::Flat), Action::Hold);
        }
        // RSI pinned at 100 is an exit while long
        assert_eq!(compiled.decide(11, PositionState::Long), Action::Close);
    }

    #[test]
    fn test_bollinger_volume_needs_volume_confirmation() {
        let params = BollingerVolumeParams {
            period: 5,
            std_dev_multiplier: 1.0,
            volume_period: 5,
        };
        let prices = vec![100.0, 101.0, 99.0, 100.0, 101.0, 100.0, 99.0, 80.0];
        // Crash bar arrives on *below*-average volume
        let volumes = vec![1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 500.0];
        let compiled = params.compile(&series_with_volumes(&prices, &volumes));
        assert_eq!(compiled.decide(7, PositionState::Flat), Action::Hold);

        // Same crash on heavy volume
        let volumes = vec![1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 5000.0];
        let compiled = params.compile(&series_with_volumes(&prices, &volumes));
        assert_eq!(compiled.decide(7, PositionState::Flat), Action::Buy);
    }

    #[test]
    fn test_bollinger_volume_exits_at_middle_band() {
        let params = BollingerVolumeParams {
            period: 5,
            std_dev_multiplier: 1.0,
            volume_period: 5,
        };
        // Close well above the rolling mean of the trailing window
        let prices = vec![100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 112.0];
        let compiled = params.compile(&series_from_closes(&prices));

        assert_eq!(compiled.decide(6, PositionState::Long), Action::Close);
    }

    #[test]
    fn test_adx_trend_requires_price_above_ma() {
        let params = AdxTrendParams {
            adx_period: 3,
            entry_level: 25.0,
            ma_period: 4,
        };
        // Strong downtrend: ADX is high but price is under its SMA
        let down: Vec<f64> = (0..30).map(|i| 200.0 - i as f64 * 2.0).collect();
        let compiled = params.compile(&series_from_closes(&down));
        assert_eq!(compiled.decide(29, PositionState::Flat), Action::Hold);
        // And the broken trend filter is the exit while long
        assert_eq!(compiled.decide(29, PositionState::Long), Action::Close);

        // Strong uptrend: ADX high and price above its SMA
        let up: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 2.0).collect();
        let compiled = params.compile(&series_from_closes(&up));
        assert_eq!(compiled.decide(29, PositionState::Flat), Action::Buy);
    }

    #[test]
    fn test_ma_volatility_gates_on_quiet_markets() {
        let params = MaVolatilityParams {
            fast_period: 2,
            slow_period: 4,
            vol_period: 4,
            vol_threshold: 0.02,
        };
        // Slow drift upward: fast above slow but volatility near zero
        let quiet: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 0.1).collect();
        let compiled = params.compile(&series_from_closes(&quiet));
        assert_eq!(compiled.decide(19, PositionState::Flat), Action::Hold);

        // Choppy rally: the same spread with real return dispersion
        let mut price = 100.0;
        let wild: Vec<f64> = (0..20)
            .map(|i| {
                let v = price;
                price *= if i % 2 == 0 { 1.2 } else { 0.9 };
                v
            })
            .collect();
        let compiled = params.compile(&series_from_closes(&wild));
        assert_eq!(compiled.decide(19, PositionState::Flat), Action::Buy);
    }
}
