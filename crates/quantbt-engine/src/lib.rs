//! Backtesting engine.
//!
//! The simulation loop drives one (symbol, strategy) pair bar by bar
//! against a single-position portfolio; the metrics module reduces the
//! resulting equity curve to summary risk statistics; the sweep module
//! batches runs across symbols and strategies with per-pair failure
//! recovery and cancellation.

mod metrics;
mod report;
mod simulator;
mod sweep;

pub use metrics::{
    annualized_return, annualized_volatility, daily_returns, max_drawdown, sharpe_ratio,
    total_return, TRADING_DAYS_PER_YEAR,
};
pub use report::SweepReport;
pub use simulator::{simulate, SimulatorConfig};
pub use sweep::{
    resolve_strategies, run_sweep, CancelToken, SkipReason, StrategyResolution, SweepOutcome,
    SweepRequest, SweepSkip,
};
