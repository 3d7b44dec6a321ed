//! Bar-by-bar simulation of one (symbol, strategy) pair.

use quantbt_core::error::SimulationError;
use quantbt_core::types::{Action, BarSeries, Portfolio, SizingPolicy, StrategyResult};
use quantbt_strategies::Strategy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics;

/// Simulation configuration shared by every run of a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Starting cash per run
    pub starting_cash: Decimal,
    /// Commission as a fraction of traded value, charged on entry and exit
    pub commission_rate: Decimal,
    /// Position sizing policy
    pub sizing: SizingPolicy,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            starting_cash: dec!(10000),
            commission_rate: Decimal::ZERO,
            sizing: SizingPolicy::FullCash,
        }
    }
}

/// Run one strategy over one bar series.
///
/// Fills happen at the same bar's close. The position state machine is
/// {Flat, Long}: a Buy is accepted only while flat and a Close only
/// while long, regardless of what the strategy proposes. A position
/// still open after the last bar stays open; its mark-to-market value
/// is part of the final equity but no trade record is created for it.
///
/// Fails with [`SimulationError::InsufficientHistory`] when the series
/// is shorter than the strategy's warm-up window.
pub fn simulate(
    label: &str,
    strategy: &Strategy,
    series: &BarSeries,
    config: &SimulatorConfig,
) -> Result<StrategyResult, SimulationError> {
    let available = series.len();
    if available == 0 {
        return Err(SimulationError::EmptySeries);
    }
    let required = strategy.warmup();
    if available < required {
        return Err(SimulationError::InsufficientHistory {
            required,
            available,
        });
    }

    let compiled = strategy.compile(series);
    let bands = strategy.exit_bands();
    let mut portfolio = Portfolio::new(config.starting_cash);
    let mut equity_curve: Vec<(i64, Decimal)> = Vec::with_capacity(available);

    for (i, bar) in series.iter().enumerate() {
        let price = Decimal::try_from(bar.close).unwrap_or_default();

        // Warm-up bars never signal, even for recurrence-seeded
        // indicators that are numerically defined from the first bar.
        let action = if i + 1 < required {
            Action::Hold
        } else {
            compiled.decide(i, portfolio.state())
        };

        match action {
            Action::Buy if portfolio.is_flat() && price > Decimal::ZERO => {
                let equity = portfolio.equity(price);
                let budget = config.sizing.budget(portfolio.cash, equity);
                portfolio.open_long(i, price, budget, config.commission_rate);
            }
            Action::Close if portfolio.is_long() => {
                portfolio.close_long(i, price, config.commission_rate);
            }
            _ => {}
        }

        // Bracket exits are a secondary trigger layered on top of the
        // rule's own decision.
        if let Some(bands) = bands {
            if let Some(position) = portfolio.position().copied() {
                let stop = position.entry_price
                    * (Decimal::ONE - Decimal::try_from(bands.stop_loss).unwrap_or_default());
                let take = position.entry_price
                    * (Decimal::ONE + Decimal::try_from(bands.take_profit).unwrap_or_default());
                if price < stop || price > take {
                    portfolio.close_long(i, price, config.commission_rate);
                }
            }
        }

        equity_curve.push((bar.timestamp, portfolio.equity(price)));
    }

    let final_equity = equity_curve
        .last()
        .map(|(_, equity)| *equity)
        .unwrap_or(config.starting_cash);
    let returns = metrics::daily_returns(&equity_curve);
    let total_return = metrics::total_return(&equity_curve);

    debug!(
        label,
        symbol = %series.symbol,
        bars = available,
        trades = portfolio.trades().len(),
        "simulation complete"
    );

    Ok(StrategyResult {
        symbol: series.symbol.clone(),
        strategy: label.to_string(),
        initial_capital: config.starting_cash,
        final_equity,
        total_return,
        annualized_return: metrics::annualized_return(total_return, available),
        annualized_volatility: metrics::annualized_volatility(&returns),
        sharpe_ratio: metrics::sharpe_ratio(&returns),
        max_drawdown: metrics::max_drawdown(&equity_curve),
        bars_processed: available,
        equity_curve,
        trades: portfolio.into_trades(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantbt_core::types::Bar;
    use quantbt_strategies::{
        MomentumParams, MomentumTrailingParams, RsiParams, SmaCrossParams,
    };

    fn series_from_closes(prices: &[f64]) -> BarSeries {
        let mut series = BarSeries::new("TEST".to_string());
        for (i, &price) in prices.iter().enumerate() {
            series.push(Bar::new(
                i as i64 * 86_400_000,
                price,
                price + 1.0,
                price - 1.0,
                price,
                1000.0,
            ));
        }
        series
    }

    #[test]
    fn test_flat_series_sma_cross_is_inert() {
        // 50 constant bars: no crossover ever fires, the equity curve
        // stays pinned at starting cash.
        let strategy = Strategy::SmaCross(SmaCrossParams {
            fast_period: 10,
            slow_period: 30,
        });
        let series = series_from_closes(&vec![100.0; 50]);
        let result = simulate("sma_cross", &strategy, &series, &SimulatorConfig::default()).unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.final_equity, dec!(10000));
        assert_eq!(result.total_return, 0.0);
        assert_eq!(result.max_drawdown, 0.0);
        assert!(result
            .equity_curve
            .iter()
            .all(|(_, equity)| *equity == dec!(10000)));
    }

    #[test]
    fn test_rising_series_rsi_never_enters() {
        // RSI on a strictly rising series never dips below the
        // oversold gate: zero trades, final equity untouched.
        let strategy = Strategy::Rsi(RsiParams::default());
        let prices: Vec<f64> = (0..50).map(|i| 100.0 + i as f64 * 2.0).collect();
        let series = series_from_closes(&prices);
        let result = simulate("rsi", &strategy, &series, &SimulatorConfig::default()).unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.final_equity, dec!(10000));
    }

    #[test]
    fn test_single_round_trip_accounting() {
        // Buy the full 10 000 at 100 (100 units), close at 110:
        // final equity 11 000, +10%, one trade worth 1 000.
        let strategy = Strategy::Momentum(MomentumParams { period: 1 });
        let series = series_from_closes(&[99.0, 100.0, 111.0, 110.0]);
        let result = simulate("momentum", &strategy, &series, &SimulatorConfig::default()).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_price, dec!(100));
        assert_eq!(trade.exit_price, dec!(110));
        assert_eq!(trade.quantity, dec!(100));
        assert_eq!(trade.realized_pnl, dec!(1000));

        assert_eq!(result.final_equity, dec!(11000));
        assert!((result.total_return - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_open_position_not_force_closed_at_end() {
        // Entry fires but no exit condition is ever met: the run ends
        // long, final equity marks the open position, no trade record.
        let strategy = Strategy::Momentum(MomentumParams { period: 1 });
        let series = series_from_closes(&[99.0, 100.0, 110.0, 120.0]);
        let result = simulate("momentum", &strategy, &series, &SimulatorConfig::default()).unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.final_equity, dec!(12000));
    }

    #[test]
    fn test_stop_loss_band_forces_exit() {
        let strategy = Strategy::MomentumTrailing(MomentumTrailingParams {
            momentum_period: 1,
            stop_loss: 0.05,
            take_profit: 0.10,
        });
        // Buy at 101, crash through the 95.95 stop
        let series = series_from_closes(&[100.0, 101.0, 102.0, 95.0, 94.0]);
        let result = simulate(
            "momentum_trailing",
            &strategy,
            &series,
            &SimulatorConfig::default(),
        )
        .unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_price, dec!(101));
        assert_eq!(result.trades[0].exit_price, dec!(95));
        assert!(result.trades[0].realized_pnl < Decimal::ZERO);
    }

    #[test]
    fn test_take_profit_band_forces_exit() {
        let strategy = Strategy::MomentumTrailing(MomentumTrailingParams {
            momentum_period: 1,
            stop_loss: 0.05,
            take_profit: 0.10,
        });
        // Buy at 101, gap over the 111.1 take-profit level
        let series = series_from_closes(&[100.0, 101.0, 112.0, 113.0]);
        let result = simulate(
            "momentum_trailing",
            &strategy,
            &series,
            &SimulatorConfig::default(),
        )
        .unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_price, dec!(112));
        assert!(result.trades[0].realized_pnl > Decimal::ZERO);
    }

    #[test]
    fn test_insufficient_history_is_an_error() {
        let strategy = Strategy::SmaCross(SmaCrossParams {
            fast_period: 10,
            slow_period: 30,
        });
        let series = series_from_closes(&vec![100.0; 20]);
        let result = simulate("sma_cross", &strategy, &series, &SimulatorConfig::default());

        assert!(matches!(
            result,
            Err(SimulationError::InsufficientHistory {
                required: 31,
                available: 20
            })
        ));
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let strategy = Strategy::Rsi(RsiParams::default());
        let series = BarSeries::new("TEST".to_string());
        let result = simulate("rsi", &strategy, &series, &SimulatorConfig::default());

        assert!(matches!(result, Err(SimulationError::EmptySeries)));
    }

    #[test]
    fn test_commission_drags_equity() {
        let strategy = Strategy::Momentum(MomentumParams { period: 1 });
        let series = series_from_closes(&[99.0, 100.0, 111.0, 110.0]);

        let with_fees = simulate(
            "momentum",
            &strategy,
            &series,
            &SimulatorConfig {
                commission_rate: dec!(0.001),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(with_fees.final_equity < dec!(11000));
        assert!(with_fees.final_equity > dec!(10900));
    }

    #[test]
    fn test_percent_of_equity_sizing_keeps_cash_back() {
        let strategy = Strategy::Momentum(MomentumParams { period: 1 });
        let series = series_from_closes(&[99.0, 100.0, 111.0, 110.0]);

        let result = simulate(
            "momentum",
            &strategy,
            &series,
            &SimulatorConfig {
                sizing: SizingPolicy::PercentOfEquity { percent: dec!(95) },
                ..Default::default()
            },
        )
        .unwrap();

        // 95% of 10 000 at price 100: 95 units, 500 cash held back
        assert_eq!(result.trades[0].quantity, dec!(95));
        assert_eq!(result.final_equity, dec!(10950));
    }

    #[test]
    fn test_equity_curve_length_matches_bars() {
        let strategy = Strategy::Rsi(RsiParams::default());
        let prices: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.4).sin() * 10.0)
            .collect();
        let series = series_from_closes(&prices);
        let result = simulate("rsi", &strategy, &series, &SimulatorConfig::default()).unwrap();

        assert_eq!(result.equity_curve.len(), 60);
        assert_eq!(result.bars_processed, 60);
    }
}
