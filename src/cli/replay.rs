use anyhow::{Context, Result};
use tracing::info;

use autotrack::{replay, AutotrackConfig, PageFixture};

use super::commands::ReplayArgs;

pub async fn cmd_replay(args: ReplayArgs, mut config: AutotrackConfig) -> Result<()> {
    let mut fixture = PageFixture::load(&args.fixture)
        .with_context(|| format!("failed to load fixture {}", args.fixture.display()))?;
    if let Some(token) = args.token {
        fixture.token = Some(token.clone());
        config.token = token;
    }

    let report = replay(&config, &fixture).await.context("replay failed")?;
    info!(outcome = ?report.outcome, events = report.events.len(), "replay finished");

    for script in &report.editor_scripts {
        eprintln!("editor script injected: {}", script);
    }
    for event in &report.events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
