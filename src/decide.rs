//! Remote capability query ("decide").

use std::collections::HashMap;

use async_trait::async_trait;
use autotrack_core_types::CustomPropertyDefinition;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::errors::{AutotrackError, AutotrackResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecideRequest {
    pub verbose: bool,
    pub version: String,
    pub lib: String,
    pub token: String,
}

impl DecideRequest {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            verbose: true,
            version: "1".to_string(),
            lib: "web".to_string(),
            token: token.into(),
        }
    }
}

/// Raw transport reply: response headers plus the JSON body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecideReply {
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl DecideReply {
    pub fn new(body: Value) -> Self {
        Self {
            headers: HashMap::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// What the instrumentation takes from a decide body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecideResponse {
    pub enable_collect_everything: bool,
    pub custom_properties: Vec<CustomPropertyDefinition>,
}

impl DecideResponse {
    /// Only a literal `true` enables tracking. Unreadable custom property
    /// rules are dropped with a warning.
    pub fn from_body(body: &Value) -> AutotrackResult<Self> {
        let Value::Object(map) = body else {
            return Err(AutotrackError::decide(format!("unexpected body: {}", body)));
        };
        let enable_collect_everything = map
            .get("config")
            .and_then(|config| config.get("enable_collect_everything"))
            == Some(&Value::Bool(true));

        let custom_properties = match map.get("custom_properties") {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|err| {
                warn!(target: "autotrack.init", error = %err, "ignoring malformed custom properties");
                Vec::new()
            }),
        };

        Ok(Self {
            enable_collect_everything,
            custom_properties,
        })
    }
}

#[async_trait]
pub trait DecideClient: Send + Sync {
    async fn decide(&self, url: &str, request: &DecideRequest) -> AutotrackResult<DecideReply>;
}

/// Canned decide client; records every request it receives.
pub struct StaticDecideClient {
    reply: Result<DecideReply, String>,
    requests: Mutex<Vec<(String, DecideRequest)>>,
}

impl StaticDecideClient {
    pub fn new(reply: DecideReply) -> Self {
        Self {
            reply: Ok(reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn enabled(custom_properties: Vec<CustomPropertyDefinition>) -> Self {
        Self::new(DecideReply::new(json!({
            "config": { "enable_collect_everything": true },
            "custom_properties": custom_properties,
        })))
    }

    pub fn disabled() -> Self {
        Self::new(DecideReply::new(json!({
            "config": { "enable_collect_everything": false },
        })))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, DecideRequest)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl DecideClient for StaticDecideClient {
    async fn decide(&self, url: &str, request: &DecideRequest) -> AutotrackResult<DecideReply> {
        self.requests
            .lock()
            .push((url.to_string(), request.clone()));
        self.reply.clone().map_err(AutotrackError::Decide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_literal_true_enables() {
        let on = DecideResponse::from_body(&json!({"config": {"enable_collect_everything": true}}))
            .unwrap();
        assert!(on.enable_collect_everything);

        for body in [
            json!({"config": {"enable_collect_everything": "true"}}),
            json!({"config": {}}),
            json!({}),
        ] {
            assert!(!DecideResponse::from_body(&body).unwrap().enable_collect_everything);
        }
        assert!(DecideResponse::from_body(&json!("nope")).is_err());
    }

    #[test]
    fn custom_properties_parse_or_drop() {
        let parsed = DecideResponse::from_body(&json!({
            "config": {"enable_collect_everything": true},
            "custom_properties": [
                {"name": "plan", "css_selector": "#plan", "event_selectors": ["#buy"]}
            ]
        }))
        .unwrap();
        assert_eq!(
            parsed.custom_properties,
            vec![CustomPropertyDefinition::new("plan", "#plan", ["#buy"])]
        );

        let dropped = DecideResponse::from_body(&json!({
            "config": {"enable_collect_everything": true},
            "custom_properties": "oops"
        }))
        .unwrap();
        assert!(dropped.custom_properties.is_empty());
        assert!(dropped.enable_collect_everything);
    }

    #[test]
    fn request_wire_shape() {
        assert_eq!(
            serde_json::to_value(DecideRequest::new("tok")).unwrap(),
            json!({"verbose": true, "version": "1", "lib": "web", "token": "tok"})
        );
    }
}
