//! Position, portfolio and trade accounting types.

use num_traits::Zero;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PositionState;

/// An open long position. At most one exists per simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Number of units held (fractional, always positive while open)
    pub quantity: Decimal,
    /// Fill price at entry
    pub entry_price: Decimal,
    /// Bar index of the entry fill
    pub entry_index: usize,
}

/// Record of a completed round trip. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub quantity: Decimal,
    /// Gross profit/loss of the round trip (fees are charged to cash)
    pub realized_pnl: Decimal,
}

/// How much of the portfolio a new position commits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SizingPolicy {
    /// Commit all available cash
    #[default]
    FullCash,
    /// Commit a fixed percentage of current equity
    PercentOfEquity { percent: Decimal },
}

impl SizingPolicy {
    /// Cash budget for a new entry given the current portfolio state.
    pub fn budget(&self, cash: Decimal, equity: Decimal) -> Decimal {
        match self {
            SizingPolicy::FullCash => cash,
            SizingPolicy::PercentOfEquity { percent } => {
                equity * *percent / Decimal::from(100)
            }
        }
    }
}

/// Cash plus at most one open position plus the realized trade log.
/// Mutated only by the simulation loop; owned by a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    /// Available cash
    pub cash: Decimal,
    /// Open position, if any
    position: Option<Position>,
    /// Completed round trips
    trades: Vec<TradeRecord>,
}

impl Portfolio {
    /// Create a new portfolio with the configured starting cash.
    pub fn new(starting_cash: Decimal) -> Self {
        Self {
            cash: starting_cash,
            position: None,
            trades: Vec::new(),
        }
    }

    /// State of the position state machine.
    pub fn state(&self) -> PositionState {
        if self.position.is_some() {
            PositionState::Long
        } else {
            PositionState::Flat
        }
    }

    /// Check that no position is open.
    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Check that a position is open.
    pub fn is_long(&self) -> bool {
        self.position.is_some()
    }

    /// Get the open position, if any.
    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Completed trades so far.
    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Consume the portfolio, returning the trade log.
    pub fn into_trades(self) -> Vec<TradeRecord> {
        self.trades
    }

    /// Mark-to-market equity at the given price.
    pub fn equity(&self, price: Decimal) -> Decimal {
        match &self.position {
            Some(pos) => self.cash + pos.quantity * price,
            None => self.cash,
        }
    }

    /// Open a long position with the given cash budget at the given price.
    /// Quantity is sized so that cost plus commission stays within budget.
    /// A no-op when a position is already open or the price is not positive.
    pub fn open_long(
        &mut self,
        index: usize,
        price: Decimal,
        budget: Decimal,
        commission_rate: Decimal,
    ) {
        if self.position.is_some() || price <= Decimal::ZERO || budget <= Decimal::ZERO {
            return;
        }

        let quantity = budget / (price * (Decimal::ONE + commission_rate));
        let cost = quantity * price;
        let fee = cost * commission_rate;

        self.cash -= cost + fee;
        self.position = Some(Position {
            quantity,
            entry_price: price,
            entry_index: index,
        });
    }

    /// Close the open position at the given price, realizing P&L.
    /// A no-op when flat.
    pub fn close_long(&mut self, index: usize, price: Decimal, commission_rate: Decimal) {
        let Some(pos) = self.position.take() else {
            return;
        };

        let proceeds = pos.quantity * price;
        let fee = proceeds * commission_rate;
        self.cash += proceeds - fee;

        self.trades.push(TradeRecord {
            entry_index: pos.entry_index,
            exit_index: index,
            entry_price: pos.entry_price,
            exit_price: price,
            quantity: pos.quantity,
            realized_pnl: (price - pos.entry_price) * pos.quantity,
        });
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new(Decimal::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_full_cash_round_trip() {
        let mut portfolio = Portfolio::new(dec!(10000));
        portfolio.open_long(0, dec!(100), dec!(10000), Decimal::ZERO);

        let pos = portfolio.position().unwrap();
        assert_eq!(pos.quantity, dec!(100));
        assert_eq!(portfolio.cash, Decimal::ZERO);
        assert!(portfolio.is_long());

        portfolio.close_long(5, dec!(110), Decimal::ZERO);
        assert!(portfolio.is_flat());
        assert_eq!(portfolio.cash, dec!(11000));

        let trades = portfolio.trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].realized_pnl, dec!(1000));
        assert_eq!(trades[0].entry_index, 0);
        assert_eq!(trades[0].exit_index, 5);
    }

    #[test]
    fn test_open_is_noop_while_long() {
        let mut portfolio = Portfolio::new(dec!(10000));
        portfolio.open_long(0, dec!(100), dec!(10000), Decimal::ZERO);
        let before = *portfolio.position().unwrap();

        portfolio.open_long(1, dec!(50), dec!(10000), Decimal::ZERO);
        assert_eq!(*portfolio.position().unwrap(), before);
    }

    #[test]
    fn test_close_is_noop_while_flat() {
        let mut portfolio = Portfolio::new(dec!(10000));
        portfolio.close_long(0, dec!(100), Decimal::ZERO);

        assert!(portfolio.trades().is_empty());
        assert_eq!(portfolio.cash, dec!(10000));
    }

    #[test]
    fn test_commission_charged_both_ways() {
        let mut portfolio = Portfolio::new(dec!(10000));
        portfolio.open_long(0, dec!(100), dec!(10000), dec!(0.001));

        // Quantity sized so cost + fee does not exceed the budget
        let pos = *portfolio.position().unwrap();
        assert!(pos.quantity < dec!(100));
        assert!(portfolio.cash >= dec!(-0.0001));

        portfolio.close_long(1, dec!(100), dec!(0.001));
        // Flat price, fees on both sides: equity must be below start
        assert!(portfolio.cash < dec!(10000));
    }

    #[test]
    fn test_equity_marks_open_position() {
        let mut portfolio = Portfolio::new(dec!(10000));
        assert_eq!(portfolio.equity(dec!(123)), dec!(10000));

        portfolio.open_long(0, dec!(100), dec!(10000), Decimal::ZERO);
        assert_eq!(portfolio.equity(dec!(110)), dec!(11000));
    }

    #[test]
    fn test_sizing_policy_budget() {
        let full = SizingPolicy::FullCash;
        assert_eq!(full.budget(dec!(500), dec!(1000)), dec!(500));

        let pct = SizingPolicy::PercentOfEquity { percent: dec!(95) };
        assert_eq!(pct.budget(dec!(1000), dec!(1000)), dec!(950));
    }
}
