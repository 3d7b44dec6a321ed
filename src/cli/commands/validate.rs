//! Validate configuration command.

use anyhow::{Context, Result};
use std::path::Path;

use quantbt_strategies::StrategyRegistry;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = quantbt_config::load_config(config_path)
        .with_context(|| format!("failed to load '{}'", config_path.display()))?;

    println!("configuration loaded from '{}'", config_path.display());
    println!("  app:             {} ({})", config.app.name, config.app.environment);
    println!("  logging:         {} / {}", config.logging.level, config.logging.format);
    println!("  starting cash:   {}", config.backtest.starting_cash);
    println!("  commission rate: {}", config.backtest.commission_rate);

    // Strategy overrides must name known strategies and build cleanly.
    let registry = StrategyRegistry::new();
    let mut bad = 0usize;
    for (id, overrides) in &config.strategies {
        match registry.create_with_overrides(id, overrides) {
            Ok(strategy) => {
                println!("  strategy '{}': ok ({})", id, strategy.kind());
            }
            Err(err) => {
                bad += 1;
                eprintln!("  strategy '{}': {}", id, err);
            }
        }
    }

    if bad > 0 {
        anyhow::bail!("{} invalid strategy override(s)", bad);
    }

    println!("configuration is valid");
    Ok(())
}
