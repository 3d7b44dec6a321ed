//! Trading strategy rules.
//!
//! Each strategy is a tagged variant of [`Strategy`] carrying its own
//! parameter record. A variant compiles against a bar series into the
//! indicator series it needs, and is then driven through a single pure
//! decision function: `decide(bar index, position state) -> Action`.
//! Entry rules only ever propose a Buy while flat and exit rules only
//! ever propose a Close while long; the simulation loop re-checks both.
//!
//! Strategy identifiers resolve through [`StrategyRegistry`], which is
//! validated at configuration time: an unknown identifier fails fast
//! instead of surfacing mid-run.

mod channel;
mod combo;
mod crossover;
mod registry;
mod strategy;
mod threshold;
mod trailing;

pub use channel::{BollingerParams, DonchianParams, IchimokuParams, ZScoreParams};
pub use combo::{
    AdxTrendParams, BollingerVolumeParams, MaRsiParams, MaVolatilityParams, RsiMacdParams,
};
pub use crossover::{EmaCrossParams, MacdCrossParams, SmaCrossParams};
pub use registry::{StrategyInfo, StrategyRegistry};
pub use strategy::{CompiledStrategy, ExitBands, Strategy};
pub use threshold::{AdxParams, MomentumParams, RsiParams, SmaTrendParams, StochasticParams};
pub use trailing::MomentumTrailingParams;
