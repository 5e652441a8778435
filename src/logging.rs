use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ConfigError;

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Installs the global subscriber on stderr. `RUST_LOG` wins over `level`;
/// `debug` forces debug output. Later calls are no-ops.
pub fn init_logging(level: &str, debug: bool, json: bool) -> Result<(), ConfigError> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level
            .parse::<tracing::Level>()
            .map_err(|err| ConfigError::Invalid(format!("invalid log level '{}': {}", level, err)))?
    };

    INSTALLED.get_or_try_init(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        let registry = tracing_subscriber::registry().with(filter);
        let installed = if json {
            registry.with(fmt_layer.json()).try_init()
        } else {
            registry.with(fmt_layer).try_init()
        };
        installed.map_err(|err| ConfigError::Invalid(format!("{}", err)))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_level() {
        assert!(matches!(
            init_logging("chatty", false, false),
            Err(ConfigError::Invalid(_))
        ));
    }
}
