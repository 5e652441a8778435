use super::config::cmd_config;
use super::env::CliArgs;
use super::replay::cmd_replay;
use super::rollout::cmd_rollout;
use super::sanitize::cmd_sanitize;
use crate::cli::commands::Commands;
use anyhow::Result;
use autotrack::AutotrackConfig;

pub async fn dispatch(cli: &CliArgs, config: AutotrackConfig) -> Result<()> {
    match cli.command.clone() {
        Commands::Replay(args) => cmd_replay(args, config).await,
        Commands::Rollout(args) => cmd_rollout(args, &config),
        Commands::Sanitize(args) => cmd_sanitize(args),
        Commands::Config(args) => cmd_config(args, &config),
    }
}
