use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Replay a page fixture and print every emitted event as a JSON line
    Replay(ReplayArgs),
    /// Check whether a project token falls into the enabled rollout buckets
    Rollout(RolloutArgs),
    /// Run a value through the field sanitizer
    Sanitize(SanitizeArgs),
    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(Args, Clone)]
pub struct ReplayArgs {
    /// Fixture JSON file
    pub fixture: PathBuf,

    /// Project token, overriding config and fixture
    #[arg(long)]
    pub token: Option<String>,
}

#[derive(Args, Clone)]
pub struct RolloutArgs {
    pub token: String,

    /// Total number of buckets (defaults to the configured value)
    #[arg(long)]
    pub buckets: Option<u32>,

    /// Number of enabled buckets (defaults to the configured value)
    #[arg(long)]
    pub enabled: Option<u32>,
}

#[derive(Args, Clone)]
pub struct SanitizeArgs {
    pub value: String,

    /// Field kind, e.g. text, password, hidden
    #[arg(long, default_value = "text")]
    pub kind: String,

    /// Field name or id
    #[arg(long)]
    pub name: Option<String>,

    /// Class attribute of the field
    #[arg(long, default_value = "")]
    pub class: String,
}

#[derive(Args, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration as YAML
    Show,
}
