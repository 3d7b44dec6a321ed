//! The closed set of strategy variants.
//!
//! Every variant carries its own parameter record; parameters are part
//! of a strategy's identity, not global state. Compiling a variant
//! against a bar series precomputes the aligned indicator series it
//! needs, after which `decide` is a pure function of the bar index and
//! the position state.

use quantbt_core::error::StrategyError;
use quantbt_core::types::{Action, BarSeries, PositionState};

use crate::channel::{
    BollingerParams, BollingerSeries, DonchianParams, DonchianSeries, IchimokuParams,
    IchimokuSeries, ZScoreParams, ZScoreSeries,
};
use crate::combo::{
    AdxTrendParams, AdxTrendSeries, BollingerVolumeParams, BollingerVolumeSeries, MaRsiParams,
    MaRsiSeries, MaVolatilityParams, MaVolatilitySeries, RsiMacdParams, RsiMacdSeries,
};
use crate::crossover::{
    EmaCrossParams, EmaCrossSeries, MacdCrossParams, MacdCrossSeries, SmaCrossParams,
    SmaCrossSeries,
};
use crate::threshold::{
    AdxParams, AdxSeries, MomentumParams, MomentumSeries, RsiParams, RsiSeries, SmaTrendParams,
    SmaTrendSeries, StochasticParams, StochasticSeries,
};
use crate::trailing::{MomentumTrailingParams, MomentumTrailingSeries};

/// Stop-loss/take-profit fractions around the entry price, applied by
/// the simulation loop as a secondary exit trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitBands {
    /// Force a close below `entry * (1 - stop_loss)`
    pub stop_loss: f64,
    /// Force a close above `entry * (1 + take_profit)`
    pub take_profit: f64,
}

/// A strategy variant with its parameters.
#[derive(Debug, Clone)]
pub enum Strategy {
    SmaCross(SmaCrossParams),
    EmaCross(EmaCrossParams),
    MacdCross(MacdCrossParams),
    SmaTrend(SmaTrendParams),
    Rsi(RsiParams),
    Stochastic(StochasticParams),
    Bollinger(BollingerParams),
    BollingerVolume(BollingerVolumeParams),
    Adx(AdxParams),
    AdxTrend(AdxTrendParams),
    Momentum(MomentumParams),
    MomentumTrailing(MomentumTrailingParams),
    Donchian(DonchianParams),
    Ichimoku(IchimokuParams),
    MaRsi(MaRsiParams),
    RsiMacd(RsiMacdParams),
    ZScore(ZScoreParams),
    MaVolatility(MaVolatilityParams),
}

impl Strategy {
    /// Human-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Strategy::SmaCross(_) => "SMA Crossover",
            Strategy::EmaCross(_) => "EMA Crossover",
            Strategy::MacdCross(_) => "MACD Crossover",
            Strategy::SmaTrend(_) => "SMA Trend",
            Strategy::Rsi(_) => "RSI Reversal",
            Strategy::Stochastic(_) => "Stochastic Reversal",
            Strategy::Bollinger(_) => "Bollinger Reversal",
            Strategy::BollingerVolume(_) => "Bollinger + Volume",
            Strategy::Adx(_) => "ADX Strength",
            Strategy::AdxTrend(_) => "ADX + Trend Filter",
            Strategy::Momentum(_) => "Momentum",
            Strategy::MomentumTrailing(_) => "Momentum + Brackets",
            Strategy::Donchian(_) => "Donchian Breakout",
            Strategy::Ichimoku(_) => "Ichimoku Cloud",
            Strategy::MaRsi(_) => "MA + RSI",
            Strategy::RsiMacd(_) => "RSI + MACD",
            Strategy::ZScore(_) => "Z-Score Reversion",
            Strategy::MaVolatility(_) => "MA + Volatility",
        }
    }

    /// Validate the parameter record.
    pub fn validate(&self) -> Result<(), StrategyError> {
        match self {
            Strategy::SmaCross(p) => p.validate(),
            Strategy::EmaCross(p) => p.validate(),
            Strategy::MacdCross(p) => p.validate(),
            Strategy::SmaTrend(p) => p.validate(),
            Strategy::Rsi(p) => p.validate(),
            Strategy::Stochastic(p) => p.validate(),
            Strategy::Bollinger(p) => p.validate(),
            Strategy::BollingerVolume(p) => p.validate(),
            Strategy::Adx(p) => p.validate(),
            Strategy::AdxTrend(p) => p.validate(),
            Strategy::Momentum(p) => p.validate(),
            Strategy::MomentumTrailing(p) => p.validate(),
            Strategy::Donchian(p) => p.validate(),
            Strategy::Ichimoku(p) => p.validate(),
            Strategy::MaRsi(p) => p.validate(),
            Strategy::RsiMacd(p) => p.validate(),
            Strategy::ZScore(p) => p.validate(),
            Strategy::MaVolatility(p) => p.validate(),
        }
    }

    /// Number of bars needed before the first signal can fire. A series
    /// shorter than this cannot be simulated.
    pub fn warmup(&self) -> usize {
        match self {
            Strategy::SmaCross(p) => p.warmup(),
            Strategy::EmaCross(p) => p.warmup(),
            Strategy::MacdCross(p) => p.warmup(),
            Strategy::SmaTrend(p) => p.warmup(),
            Strategy::Rsi(p) => p.warmup(),
            Strategy::Stochastic(p) => p.warmup(),
            Strategy::Bollinger(p) => p.warmup(),
            Strategy::BollingerVolume(p) => p.warmup(),
            Strategy::Adx(p) => p.warmup(),
            Strategy::AdxTrend(p) => p.warmup(),
            Strategy::Momentum(p) => p.warmup(),
            Strategy::MomentumTrailing(p) => p.warmup(),
            Strategy::Donchian(p) => p.warmup(),
            Strategy::Ichimoku(p) => p.warmup(),
            Strategy::MaRsi(p) => p.warmup(),
            Strategy::RsiMacd(p) => p.warmup(),
            Strategy::ZScore(p) => p.warmup(),
            Strategy::MaVolatility(p) => p.warmup(),
        }
    }

    /// Bracket exits the simulation loop must overlay, if the variant
    /// uses them.
    pub fn exit_bands(&self) -> Option<ExitBands> {
        match self {
            Strategy::MomentumTrailing(p) => Some(p.exit_bands()),
            _ => None,
        }
    }

    /// Precompute the indicator series this variant reads.
    pub fn compile(&self, series: &BarSeries) -> CompiledStrategy {
        let inner = match self {
            Strategy::SmaCross(p) => Compiled::SmaCross(p.compile(series)),
            Strategy::EmaCross(p) => Compiled::EmaCross(p.compile(series)),
            Strategy::MacdCross(p) => Compiled::MacdCross(p.compile(series)),
            Strategy::SmaTrend(p) => Compiled::SmaTrend(p.compile(series)),
            Strategy::Rsi(p) => Compiled::Rsi(p.compile(series)),
            Strategy::Stochastic(p) => Compiled::Stochastic(p.compile(series)),
            Strategy::Bollinger(p) => Compiled::Bollinger(p.compile(series)),
            Strategy::BollingerVolume(p) => Compiled::BollingerVolume(p.compile(series)),
            Strategy::Adx(p) => Compiled::Adx(p.compile(series)),
            Strategy::AdxTrend(p) => Compiled::AdxTrend(p.compile(series)),
            Strategy::Momentum(p) => Compiled::Momentum(p.compile(series)),
            Strategy::MomentumTrailing(p) => Compiled::MomentumTrailing(p.compile(series)),
            Strategy::Donchian(p) => Compiled::Donchian(p.compile(series)),
            Strategy::Ichimoku(p) => Compiled::Ichimoku(p.compile(series)),
            Strategy::MaRsi(p) => Compiled::MaRsi(p.compile(series)),
            Strategy::RsiMacd(p) => Compiled::RsiMacd(p.compile(series)),
            Strategy::ZScore(p) => Compiled::ZScore(p.compile(series)),
            Strategy::MaVolatility(p) => Compiled::MaVolatility(p.compile(series)),
        };
        CompiledStrategy { inner }
    }
}

/// A strategy bound to the indicator series of one bar series.
pub struct CompiledStrategy {
    inner: Compiled,
}

enum Compiled {
    SmaCross(SmaCrossSeries),
    EmaCross(EmaCrossSeries),
    MacdCross(MacdCrossSeries),
    SmaTrend(SmaTrendSeries),
    Rsi(RsiSeries),
    Stochastic(StochasticSeries),
    Bollinger(BollingerSeries),
    BollingerVolume(BollingerVolumeSeries),
    Adx(AdxSeries),
    AdxTrend(AdxTrendSeries),
    Momentum(MomentumSeries),
    MomentumTrailing(MomentumTrailingSeries),
    Donchian(DonchianSeries),
    Ichimoku(IchimokuSeries),
    MaRsi(MaRsiSeries),
    RsiMacd(RsiMacdSeries),
    ZScore(ZScoreSeries),
    MaVolatility(MaVolatilitySeries),
}

impl CompiledStrategy {
    /// Pure decision for bar `i` given the current position state.
    ///
    /// A Buy is only ever proposed while flat, a Close only while long;
    /// warm-up bars always hold.
    pub fn decide(&self, i: usize, state: PositionState) -> Action {
        match &self.inner {
            Compiled::SmaCross(s) => s.decide(i, state),
            Compiled::EmaCross(s) => s.decide(i, state),
            Compiled::MacdCross(s) => s.decide(i, state),
            Compiled::SmaTrend(s) => s.decide(i, state),
            Compiled::Rsi(s) => s.decide(i, state),
            Compiled::Stochastic(s) => s.decide(i, state),
            Compiled::Bollinger(s) => s.decide(i, state),
            Compiled::BollingerVolume(s) => s.decide(i, state),
            Compiled::Adx(s) => s.decide(i, state),
            Compiled::AdxTrend(s) => s.decide(i, state),
            Compiled::Momentum(s) => s.decide(i, state),
            Compiled::MomentumTrailing(s) => s.decide(i, state),
            Compiled::Donchian(s) => s.decide(i, state),
            Compiled::Ichimoku(s) => s.decide(i, state),
            Compiled::MaRsi(s) => s.decide(i, state),
            Compiled::RsiMacd(s) => s.decide(i, state),
            Compiled::ZScore(s) => s.decide(i, state),
            Compiled::MaVolatility(s) => s.decide(i, state),
        }
    }
}
