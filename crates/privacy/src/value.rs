use serde::{Deserialize, Serialize};

/// A form field value: a scalar, or several values (checkbox groups,
/// multi-selects, repeated field names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::List(_) => None,
        }
    }

    pub fn into_values(self) -> Vec<String> {
        match self {
            FieldValue::Text(text) => vec![text],
            FieldValue::List(values) => values,
        }
    }

    /// Appends `other` after `self`, flattening both into a list.
    pub fn merge(self, other: FieldValue) -> FieldValue {
        let mut values = self.into_values();
        values.extend(other.into_values());
        FieldValue::List(values)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Text(text) => serde_json::Value::String(text),
            FieldValue::List(values) => {
                serde_json::Value::Array(values.into_iter().map(serde_json::Value::String).collect())
            }
        }
    }
}
