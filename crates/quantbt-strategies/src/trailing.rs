//! Momentum entry with bracket exits.
//!
//! The rule itself only proposes entries; exits come from the stop-loss
//! and take-profit bands the simulation loop applies around the entry
//! price. `decide` therefore never returns Close for this variant.

use quantbt_core::error::StrategyError;
use quantbt_core::traits::Indicator;
use quantbt_core::types::{Action, BarSeries, PositionState};
use quantbt_indicators::Roc;
use serde::{Deserialize, Serialize};

use crate::strategy::ExitBands;

/// Rate-of-change entry bracketed by stop-loss/take-profit fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumTrailingParams {
    /// Rate-of-change lookback period
    pub momentum_period: usize,
    /// Stop-loss as a fraction of the entry price
    pub stop_loss: f64,
    /// Take-profit as a fraction of the entry price
    pub take_profit: f64,
}

impl Default for MomentumTrailingParams {
    fn default() -> Self {
        Self {
            momentum_period: 15,
            stop_loss: 0.05,
            take_profit: 0.10,
        }
    }
}

impl MomentumTrailingParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.momentum_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Momentum period must be greater than 0".into(),
            ));
        }
        if self.stop_loss <= 0.0 || self.stop_loss >= 1.0 {
            return Err(StrategyError::InvalidConfig(
                "Stop-loss fraction must be in (0, 1)".into(),
            ));
        }
        if self.take_profit <= 0.0 {
            return Err(StrategyError::InvalidConfig(
                "Take-profit fraction must be positive".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn warmup(&self) -> usize {
        self.momentum_period + 1
    }

    pub(crate) fn exit_bands(&self) -> ExitBands {
        ExitBands {
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
        }
    }

    pub(crate) fn compile(&self, series: &BarSeries) -> MomentumTrailingSeries {
        MomentumTrailingSeries {
            roc: Roc::new(self.momentum_period).calculate(&series.closes()),
        }
    }
}

pub(crate) struct MomentumTrailingSeries {
    roc: Vec<f64>,
}

impl MomentumTrailingSeries {
    pub(crate) fn decide(&self, i: usize, state: PositionState) -> Action {
        let roc = self.roc[i];
        if roc.is_nan() {
            return Action::Hold;
        }
        match state {
            PositionState::Flat if roc > 0.0 => Action::Buy,
            // Exits are the simulation loop's bracket orders
            _ => Action::Hold,
        }
    }
}
