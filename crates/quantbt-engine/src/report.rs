//! Sweep report rendering.
//!
//! The core only produces strings; tabular display, charting and file
//! export belong to the presentation layer consuming them.

use serde::Serialize;

use quantbt_core::types::StrategyResult;

use crate::sweep::SweepOutcome;

/// Complete report over a finished sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub outcome: SweepOutcome,
}

impl SweepReport {
    /// Wrap a finished sweep.
    pub fn new(outcome: SweepOutcome) -> Self {
        Self { outcome }
    }

    /// Generate a text summary of every executed run.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                      BACKTEST SWEEP                       \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        for result in &self.outcome.results {
            s.push_str(&Self::result_block(result));
            s.push('\n');
        }

        if !self.outcome.skipped.is_empty() {
            s.push_str("SKIPPED\n");
            s.push_str("───────────────────────────────────────────────────────────\n");
            for skip in &self.outcome.skipped {
                match &skip.strategy {
                    Some(strategy) => {
                        s.push_str(&format!("  {} / {}: {:?}\n", skip.symbol, strategy, skip.reason))
                    }
                    None => s.push_str(&format!("  {}: {:?}\n", skip.symbol, skip.reason)),
                }
            }
            s.push('\n');
        }

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s
    }

    fn result_block(result: &StrategyResult) -> String {
        let mut s = String::new();

        s.push_str(&format!("{} — {}\n", result.symbol, result.strategy));
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!(
            "  Initial Capital:     $ {:.2}\n",
            result.initial_capital
        ));
        s.push_str(&format!(
            "  Final Equity:        $ {:.2}\n",
            result.final_equity
        ));
        s.push_str(&format!(
            "  Total Return:        {:.2}%\n",
            result.total_return * 100.0
        ));
        s.push_str(&format!(
            "  Annualized Return:   {:.2}%\n",
            result.annualized_return * 100.0
        ));
        s.push_str(&format!(
            "  Volatility (ann.):   {:.2}%\n",
            result.annualized_volatility * 100.0
        ));
        s.push_str(&format!(
            "  Sharpe Ratio:        {:.2}\n",
            result.sharpe_ratio
        ));
        s.push_str(&format!(
            "  Max Drawdown:        {:.2}%\n",
            result.max_drawdown * 100.0
        ));
        s.push_str(&format!(
            "  Trades:              {} ({} won / {} lost)\n",
            result.trade_count(),
            result.winning_trades(),
            result.losing_trades()
        ));
        s.push_str(&format!(
            "  Bars Processed:      {}\n",
            result.bars_processed
        ));

        s
    }

    /// Export the full outcome to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export one run's equity curve as CSV, if it exists.
    pub fn equity_to_csv(&self, symbol: &str, strategy: &str) -> Option<String> {
        let result = self
            .outcome
            .results
            .iter()
            .find(|r| r.symbol == symbol && r.strategy == strategy)?;

        let mut csv = String::from("timestamp,equity\n");
        for (timestamp, equity) in &result.equity_curve {
            csv.push_str(&format!("{},{}\n", timestamp, equity));
        }
        Some(csv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::{SkipReason, SweepSkip};
    use rust_decimal_macros::dec;

    fn sample_result() -> StrategyResult {
        StrategyResult {
            symbol: "PETR4".to_string(),
            strategy: "rsi".to_string(),
            initial_capital: dec!(10000),
            final_equity: dec!(11000),
            total_return: 0.10,
            annualized_return: 0.10,
            annualized_volatility: 0.20,
            sharpe_ratio: 0.50,
            max_drawdown: 0.05,
            bars_processed: 252,
            equity_curve: vec![(0, dec!(10000)), (86_400_000, dec!(11000))],
            trades: vec![],
        }
    }

    #[test]
    fn test_summary_contains_metrics() {
        let report = SweepReport::new(SweepOutcome {
            results: vec![sample_result()],
            skipped: vec![SweepSkip {
                symbol: "MGLU3".to_string(),
                strategy: None,
                reason: SkipReason::DataUnavailable,
            }],
        });

        let summary = report.summary();
        assert!(summary.contains("PETR4 — rsi"));
        assert!(summary.contains("10.00%"));
        assert!(summary.contains("SKIPPED"));
        assert!(summary.contains("MGLU3"));
    }

    #[test]
    fn test_equity_csv_export() {
        let report = SweepReport::new(SweepOutcome {
            results: vec![sample_result()],
            skipped: vec![],
        });

        let csv = report.equity_to_csv("PETR4", "rsi").unwrap();
        assert!(csv.starts_with("timestamp,equity\n"));
        assert!(csv.contains("0,10000"));
        assert!(csv.contains("86400000,11000"));

        assert!(report.equity_to_csv("PETR4", "unknown").is_none());
    }

    #[test]
    fn test_json_export_round_trips_fields() {
        let report = SweepReport::new(SweepOutcome {
            results: vec![sample_result()],
            skipped: vec![],
        });

        let json = report.to_json().unwrap();
        assert!(json.contains("\"symbol\": \"PETR4\""));
        assert!(json.contains("\"strategy\": \"rsi\""));
    }
}
