use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};

use autotrack::{init_logging, load_config};

use super::dispatch::dispatch;
use super::env::CliArgs;

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level, cli.debug || config.debug, config.logging.json)
        .context("failed to initialise logging")?;
    debug!("autotrack v{}", env!("CARGO_PKG_VERSION"));

    match dispatch(&cli, config).await {
        Ok(()) => Ok(()),
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
