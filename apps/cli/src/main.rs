mod config;
mod main_lib;

use std::path::Path;

use anyhow::{bail, Context};
use serde::Serialize;

use config::Config;
use main_lib::{build_state, init_tracing, log_coverage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Backfill,
}

impl Command {
    fn parse(arg: Option<&str>) -> anyhow::Result<Self> {
        match arg {
            None | Some("run") => Ok(Command::Run),
            Some("backfill") => Ok(Command::Backfill),
            Some(other) => bail!("Unknown command '{}'. Expected 'run' or 'backfill'", other),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_format);
    let arg = std::env::args().nth(1);
    let command = Command::parse(arg.as_deref())?;
    let state = build_state(&config)?;

    match command {
        Command::Run => {
            let ingestion = state.engine.config();
            tracing::info!(
                "Ingesting from {} into {} ({} attempts per instrument)",
                ingestion.history_start,
                ingestion.settlement_currency,
                ingestion.retry.max_attempts
            );
            let result = state.engine.run_cycle().await?;
            report(&result, config.result_path.as_deref())?;
            log_coverage(state.prices.as_ref())?;
            if !result.is_success() {
                bail!("Ingestion cycle failed: {}", result.summary());
            }
        }
        Command::Backfill => {
            let result = state.backfill.run().await?;
            report(&result, config.result_path.as_deref())?;
            log_coverage(state.prices.as_ref())?;
        }
    }
    Ok(())
}

/// Prints the result as pretty JSON and optionally saves it.
fn report<T: Serialize>(result: &T, path: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    if let Some(path) = path {
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write result to {}", path.display()))?;
        tracing::info!("Result written to {}", path.display());
    }
    Ok(())
}
