//! Core data types for the backtesting system.

mod action;
mod ohlcv;
mod position;
mod result;

pub use action::{Action, PositionState};
pub use ohlcv::{Bar, BarSeries};
pub use position::{Portfolio, Position, SizingPolicy, TradeRecord};
pub use result::StrategyResult;
