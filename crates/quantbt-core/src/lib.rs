//! Core types and traits for the backtesting system.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries)
//! - Position, portfolio and trade accounting types
//! - Strategy actions and simulation results
//! - Core traits for indicators and price providers

pub mod types;
pub mod traits;
pub mod error;

pub use error::{BacktestError, BacktestResult};
pub use types::*;
pub use traits::*;
