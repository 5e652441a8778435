//! Layered configuration: built-in defaults, an optional YAML file,
//! `AUTOTRACK__SECTION__KEY` environment overlays and finally a JSON blob in
//! `AUTOTRACK_CONFIG_JSON`.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

const ENV_PREFIX: &str = "AUTOTRACK__";
const ENV_JSON: &str = "AUTOTRACK_CONFIG_JSON";
// Taken verbatim from the environment; tokens may look like numbers.
const STRING_KEYS: &[&str] = &["token", "decide_host", "app_host", "logging.level"];

pub const DEFAULT_DECIDE_HOST: &str = "https://decide.mixpanel.com";
pub const DEFAULT_APP_HOST: &str = "https://mixpanel.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutotrackConfig {
    pub token: String,
    pub decide_host: String,
    pub app_host: String,
    pub debug: bool,
    pub readiness: ReadinessConfig,
    pub rollout: RolloutConfig,
    pub logging: LoggingConfig,
}

impl Default for AutotrackConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            decide_host: DEFAULT_DECIDE_HOST.to_string(),
            app_host: DEFAULT_APP_HOST.to_string(),
            debug: false,
            readiness: ReadinessConfig::default(),
            rollout: RolloutConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AutotrackConfig {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn decide_url(&self) -> String {
        format!("{}/decide/", self.decide_host.trim_end_matches('/'))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub retry_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: 500,
            max_attempts: 120,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloutConfig {
    pub total_buckets: u32,
    pub enabled_buckets: u32,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            total_buckets: 10,
            enabled_buckets: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Loads the effective configuration. A missing file is not an error.
pub fn load_config(path: Option<&Path>) -> Result<AutotrackConfig, ConfigError> {
    let mut tree = serde_json::to_value(AutotrackConfig::default())
        .map_err(|err| ConfigError::Invalid(format!("{}", err)))?;

    if let Some(path) = path.filter(|path| path.exists()) {
        for (key, value) in overlays_from_file(path)? {
            set_path(&mut tree, &key, value);
        }
    }
    for (key, value) in overlays_from_env()? {
        set_path(&mut tree, &key, value);
    }

    serde_json::from_value(tree).map_err(|err| ConfigError::Invalid(format!("{}", err)))
}

fn overlays_from_file(path: &Path) -> Result<Vec<(String, Value)>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|err| ConfigError::Io(format!("{}", err)))?;
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|err| ConfigError::Invalid(format!("{}", err)))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| ConfigError::Invalid(format!("{}", err)))?;
    Ok(flatten_value(json_value, None))
}

fn overlays_from_env() -> Result<Vec<(String, Value)>, ConfigError> {
    let mut overlays = Vec::new();
    let mut vars: Vec<(String, String)> = env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect();
    vars.sort();
    for (key, raw) in vars {
        let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let path = stripped
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(".");
        if path.is_empty() {
            continue;
        }
        let value = if STRING_KEYS.contains(&path.as_str()) {
            Value::String(raw)
        } else {
            parse_env_value(&raw)
        };
        overlays.push((path, value));
    }

    if let Ok(raw_json) = env::var(ENV_JSON) {
        if !raw_json.trim().is_empty() {
            let json_value: Value = serde_json::from_str(&raw_json)
                .map_err(|err| ConfigError::Invalid(format!("{}", err)))?;
            overlays.extend(flatten_value(json_value, None));
        }
    }

    Ok(overlays)
}

fn parse_env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return parsed;
    }
    if let Ok(boolean) = raw.parse::<bool>() {
        return Value::Bool(boolean);
    }
    if let Ok(int_val) = raw.parse::<i64>() {
        return Value::Number(int_val.into());
    }
    Value::String(raw.to_string())
}

fn flatten_value(value: Value, prefix: Option<String>) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => {
            let mut result = Vec::new();
            for (key, value) in map {
                let key_segment = key.trim().to_ascii_lowercase();
                let next_prefix = match &prefix {
                    Some(prefix) if !prefix.is_empty() => format!("{}.{}", prefix, key_segment),
                    _ => key_segment,
                };
                result.extend(flatten_value(value, Some(next_prefix)));
            }
            result
        }
        other => match prefix {
            Some(prefix) => vec![(prefix, other)],
            None => Vec::new(),
        },
    }
}

/// Writes `value` at a dotted path, creating intermediate objects.
fn set_path(tree: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    set_segments(tree, &segments, value);
}

fn set_segments(tree: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *tree = value;
        return;
    };
    if !tree.is_object() {
        *tree = Value::Object(Map::new());
    }
    if let Value::Object(map) = tree {
        let slot = map.entry(first.to_string()).or_insert(Value::Null);
        set_segments(slot, rest, value);
    }
}
