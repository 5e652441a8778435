use anyhow::Result;
use serde_json::json;

use autotrack::gate::RolloutGate;
use autotrack::AutotrackConfig;

use super::commands::RolloutArgs;

pub fn cmd_rollout(args: RolloutArgs, config: &AutotrackConfig) -> Result<()> {
    let gate = RolloutGate::new(
        args.buckets.unwrap_or(config.rollout.total_buckets),
        args.enabled.unwrap_or(config.rollout.enabled_buckets),
    )?;
    let report = json!({
        "token": &args.token,
        "total_buckets": gate.total_buckets,
        "enabled_buckets": gate.enabled_buckets,
        "enabled": gate.is_enabled(&args.token),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
