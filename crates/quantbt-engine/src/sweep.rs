//! Batch driver: every selected strategy over every selected symbol.
//!
//! Runs are independent and share no mutable state; the source system
//! executes them serially and so does this driver. Per-pair failures
//! are recovered at the loop boundary: an asset with no or malformed
//! data is skipped with a warning, a series shorter than a strategy's
//! warm-up skips just that pair, and only configuration-level problems
//! (an empty selection) abort before any simulation starts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use quantbt_core::error::{BacktestError, DataError, SimulationError, StrategyError};
use quantbt_core::traits::PriceProvider;
use quantbt_core::types::{BarSeries, StrategyResult};
use quantbt_strategies::{Strategy, StrategyRegistry};

use crate::simulator::{simulate, SimulatorConfig};

/// Caller-supplied cancellation flag, checked once per (symbol,
/// strategy) pair.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// What to sweep: symbols and a date range; strategies are resolved
/// separately so that unknown identifiers fail at configuration time.
#[derive(Debug, Clone)]
pub struct SweepRequest {
    pub symbols: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Why a symbol or pair was skipped.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Provider returned no bars for the symbol and range
    DataUnavailable,
    /// Provider data could not be interpreted
    MalformedSeries { detail: String },
    /// Fewer bars than the strategy's warm-up window
    InsufficientHistory { required: usize, available: usize },
    /// Sweep was cancelled before this pair ran
    Cancelled,
}

/// A skipped symbol (strategy `None`) or (symbol, strategy) pair.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSkip {
    pub symbol: String,
    pub strategy: Option<String>,
    pub reason: SkipReason,
}

/// Executed results plus everything that was skipped along the way.
#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub results: Vec<StrategyResult>,
    pub skipped: Vec<SweepSkip>,
}

/// Outcome of resolving strategy identifiers against the registry.
/// Unknown or invalid identifiers are reported per entry; the valid
/// remainder still runs.
pub struct StrategyResolution {
    pub strategies: Vec<(String, Strategy)>,
    pub failures: Vec<(String, StrategyError)>,
}

/// Resolve strategy identifiers to configured instances, applying
/// per-strategy parameter overrides where present.
pub fn resolve_strategies(
    registry: &StrategyRegistry,
    ids: &[String],
    overrides: &HashMap<String, Value>,
) -> StrategyResolution {
    let mut strategies = Vec::new();
    let mut failures = Vec::new();

    for id in ids {
        let built = match overrides.get(id) {
            Some(params) => registry.create_with_overrides(id, params),
            None => registry.create_default(id),
        };
        match built {
            Ok(strategy) => strategies.push((id.clone(), strategy)),
            Err(err) => {
                warn!(id = %id, error = %err, "strategy rejected");
                failures.push((id.clone(), err));
            }
        }
    }

    StrategyResolution {
        strategies,
        failures,
    }
}

/// Run every strategy over every symbol, serially.
///
/// Fetches each symbol once, normalizes the series defensively, and
/// recovers per-pair failures without aborting the batch.
pub async fn run_sweep(
    provider: &dyn PriceProvider,
    strategies: &[(String, Strategy)],
    request: &SweepRequest,
    config: &SimulatorConfig,
    cancel: &CancelToken,
) -> Result<SweepOutcome, BacktestError> {
    if strategies.is_empty() {
        return Err(BacktestError::Config("no strategy selected".into()));
    }
    if request.symbols.is_empty() {
        return Err(BacktestError::Config("no symbols selected".into()));
    }

    let mut results = Vec::new();
    let mut skipped = Vec::new();

    'symbols: for symbol in &request.symbols {
        let bars = match provider.fetch(symbol, request.start, request.end).await {
            Ok(bars) if bars.is_empty() => {
                warn!(symbol = %symbol, "no data for the requested range, skipping");
                skipped.push(SweepSkip {
                    symbol: symbol.clone(),
                    strategy: None,
                    reason: SkipReason::DataUnavailable,
                });
                continue;
            }
            Ok(bars) => bars,
            Err(DataError::NoDataAvailable) | Err(DataError::SymbolNotFound(_)) => {
                warn!(symbol = %symbol, "no data for the requested range, skipping");
                skipped.push(SweepSkip {
                    symbol: symbol.clone(),
                    strategy: None,
                    reason: SkipReason::DataUnavailable,
                });
                continue;
            }
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "unusable data, skipping");
                skipped.push(SweepSkip {
                    symbol: symbol.clone(),
                    strategy: None,
                    reason: SkipReason::MalformedSeries {
                        detail: err.to_string(),
                    },
                });
                continue;
            }
        };

        // Chronological order and unique sessions are load-bearing for
        // the bar loop, so never trust the provider with them.
        let series = BarSeries::from_bars(symbol.clone(), bars);

        for (name, strategy) in strategies {
            if cancel.is_cancelled() {
                info!("sweep cancelled");
                skipped.push(SweepSkip {
                    symbol: symbol.clone(),
                    strategy: Some(name.clone()),
                    reason: SkipReason::Cancelled,
                });
                break 'symbols;
            }

            match simulate(name, strategy, &series, config) {
                Ok(result) => results.push(result),
                Err(SimulationError::InsufficientHistory {
                    required,
                    available,
                }) => {
                    warn!(
                        symbol = %symbol,
                        strategy = %name,
                        required,
                        available,
                        "insufficient history, skipping"
                    );
                    skipped.push(SweepSkip {
                        symbol: symbol.clone(),
                        strategy: Some(name.clone()),
                        reason: SkipReason::InsufficientHistory {
                            required,
                            available,
                        },
                    });
                }
                Err(SimulationError::EmptySeries) => {
                    skipped.push(SweepSkip {
                        symbol: symbol.clone(),
                        strategy: Some(name.clone()),
                        reason: SkipReason::DataUnavailable,
                    });
                }
            }
        }
    }

    info!(
        results = results.len(),
        skipped = skipped.len(),
        "sweep finished"
    );
    Ok(SweepOutcome { results, skipped })
}
