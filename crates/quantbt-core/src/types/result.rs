//! Simulation result types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TradeRecord;

/// Outcome of one (symbol, strategy) simulation run.
/// Assembled once by the metrics aggregation step; read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResult {
    /// Symbol the run was executed against
    pub symbol: String,
    /// Registry identifier of the strategy
    pub strategy: String,
    /// Starting cash
    pub initial_capital: Decimal,
    /// Mark-to-market equity at the last bar (open positions included,
    /// never force-closed)
    pub final_equity: Decimal,
    /// Total return as a fraction (0.10 = +10%)
    pub total_return: f64,
    /// Annualized return as a fraction
    pub annualized_return: f64,
    /// Annualized volatility of daily returns
    pub annualized_volatility: f64,
    /// Sharpe ratio (0 when return volatility is 0)
    pub sharpe_ratio: f64,
    /// Maximum drawdown as a fraction of the running peak, in [0, 1]
    pub max_drawdown: f64,
    /// Number of bars simulated
    pub bars_processed: usize,
    /// Mark-to-market equity per bar: (timestamp ms, equity)
    pub equity_curve: Vec<(i64, Decimal)>,
    /// Completed round trips
    pub trades: Vec<TradeRecord>,
}

impl StrategyResult {
    /// Number of completed trades.
    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    /// Number of winning trades.
    pub fn winning_trades(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.realized_pnl > Decimal::ZERO)
            .count()
    }

    /// Number of losing trades.
    pub fn losing_trades(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.realized_pnl < Decimal::ZERO)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn trade(pnl: Decimal) -> TradeRecord {
        TradeRecord {
            entry_index: 0,
            exit_index: 1,
            entry_price: dec!(100),
            exit_price: dec!(100) + pnl / dec!(10),
            quantity: dec!(10),
            realized_pnl: pnl,
        }
    }

    #[test]
    fn test_trade_counters() {
        let result = StrategyResult {
            symbol: "VALE3".to_string(),
            strategy: "rsi".to_string(),
            initial_capital: dec!(10000),
            final_equity: dec!(10500),
            total_return: 0.05,
            annualized_return: 0.05,
            annualized_volatility: 0.1,
            sharpe_ratio: 0.5,
            max_drawdown: 0.02,
            bars_processed: 100,
            equity_curve: vec![],
            trades: vec![trade(dec!(700)), trade(dec!(-200)), trade(Decimal::ZERO)],
        };

        assert_eq!(result.trade_count(), 3);
        assert_eq!(result.winning_trades(), 1);
        assert_eq!(result.losing_trades(), 1);
    }
}
