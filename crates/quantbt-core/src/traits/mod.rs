//! Core trait definitions.

mod indicator;
mod provider;

pub use indicator::{Indicator, MultiOutputIndicator};
pub use provider::PriceProvider;
