use anyhow::Result;

use autotrack::AutotrackConfig;

use super::commands::{ConfigAction, ConfigArgs};

pub fn cmd_config(args: ConfigArgs, config: &AutotrackConfig) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", serde_yaml::to_string(config)?);
        }
    }
    Ok(())
}
