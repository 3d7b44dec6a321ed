//! Backtest sweep command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use quantbt_config::AppConfig;
use quantbt_data::CsvPriceSource;
use quantbt_engine::{
    resolve_strategies, run_sweep, CancelToken, SimulatorConfig, SweepReport, SweepRequest,
};
use quantbt_strategies::StrategyRegistry;

use crate::cli::BacktestArgs;

pub async fn run(args: BacktestArgs, config_path: &Path) -> Result<()> {
    let config = if config_path.exists() {
        quantbt_config::load_config(config_path)
            .with_context(|| format!("failed to load '{}'", config_path.display()))?
    } else {
        info!(
            "configuration file '{}' not found, using defaults",
            config_path.display()
        );
        AppConfig::default()
    };

    // Resolve every requested strategy up front; unknown or invalid
    // identifiers are reported without aborting the valid remainder.
    let registry = StrategyRegistry::new();
    let resolution = resolve_strategies(&registry, &args.strategies, &config.strategies);
    for (id, err) in &resolution.failures {
        eprintln!("strategy '{}' rejected: {}", id, err);
    }
    if resolution.strategies.is_empty() {
        anyhow::bail!("no usable strategy selected (see `quantbt strategies` for the list)");
    }

    let provider = CsvPriceSource::new(&args.data)
        .with_context(|| format!("cannot open data path '{}'", args.data.display()))?;

    let simulator_config = SimulatorConfig {
        starting_cash: args.capital.unwrap_or(config.backtest.starting_cash),
        commission_rate: args.commission.unwrap_or(config.backtest.commission_rate),
        sizing: config.backtest.sizing,
    };

    let request = SweepRequest {
        symbols: args.symbols.clone(),
        start: args.start,
        end: args.end,
    };

    // Ctrl-C stops the sweep at the next (symbol, strategy) boundary.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, stopping after the current run");
                cancel.cancel();
            }
        });
    }

    info!(
        strategies = resolution.strategies.len(),
        symbols = request.symbols.len(),
        "starting sweep"
    );
    let outcome = run_sweep(
        &provider,
        &resolution.strategies,
        &request,
        &simulator_config,
        &cancel,
    )
    .await?;

    let report = SweepReport::new(outcome);
    match args.output.as_str() {
        "json" => println!("{}", report.to_json()?),
        _ => println!("{}", report.summary()),
    }

    if let Some(save_path) = &args.save {
        std::fs::write(save_path, report.to_json()?)?;
        info!("report saved to {:?}", save_path);
    }

    Ok(())
}
