use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Credentials handed to the editor entry point and persisted in session
/// storage between pages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_host: Option<String>,
    pub bookmarklet_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_flags: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
}

impl EditorParams {
    /// True when the bundle names `token` as its project.
    pub fn matches_token(&self, token: &str) -> bool {
        self.project_token
            .as_deref()
            .is_some_and(|project| !project.is_empty() && project == token)
    }
}
