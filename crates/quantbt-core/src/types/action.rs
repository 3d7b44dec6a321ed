//! Strategy actions and position state.

use serde::{Deserialize, Serialize};

/// Decision emitted by a strategy for a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Open a long position (only meaningful while flat)
    Buy,
    /// Close the open long position (only meaningful while long)
    Close,
    /// Do nothing
    Hold,
}

/// State of the single-position state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionState {
    Flat,
    Long,
}

impl PositionState {
    /// Check whether a position is currently open.
    #[inline]
    pub fn is_long(&self) -> bool {
        matches!(self, PositionState::Long)
    }

    /// Check whether no position is open.
    #[inline]
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(PositionState::Flat.is_flat());
        assert!(!PositionState::Flat.is_long());
        assert!(PositionState::Long.is_long());
        assert!(!PositionState::Long.is_flat());
    }
}
