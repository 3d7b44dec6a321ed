//! Technical indicators.
//!
//! This crate provides the indicator library behind the strategy rules:
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD, Stochastic, Momentum, ROC)
//! - Volatility indicators (Standard Deviation, Bollinger Bands)
//! - Trend/channel indicators (ADX, Donchian Channel, Ichimoku)
//!
//! Every indicator returns a series aligned with its input: one output
//! per input point, NaN for the leading warm-up window, and `out[i]`
//! computable only from inputs up to and including `i`. All indicators
//! are pure functions of their inputs and parameters.

pub mod momentum;
pub mod moving_average;
pub mod trend;
pub mod volatility;

pub use momentum::{Macd, MacdOutput, Momentum, Roc, Rsi, Stochastic, StochasticOutput};
pub use moving_average::{Ema, Sma};
pub use trend::{Adx, DonchianChannel, DonchianOutput, Ichimoku, IchimokuOutput};
pub use volatility::{BollingerBands, BollingerOutput, StdDev};
