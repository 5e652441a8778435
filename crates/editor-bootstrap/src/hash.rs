//! URL fragment parameter reading.

use serde_json::{Map, Value};

use crate::errors::{EditorError, EditorResult};

/// Raw value of the first `name=` occurrence, up to the next `&`.
pub fn hash_param<'a>(hash: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=");
    let start = hash.find(&needle)? + needle.len();
    let rest = &hash[start..];
    Some(rest.split('&').next().unwrap_or(rest))
}

/// Percent-decoded, JSON-parsed `state` parameter. `Ok(None)` when the
/// fragment carries no state at all.
pub fn decode_state(hash: &str) -> EditorResult<Option<Map<String, Value>>> {
    let Some(raw) = hash_param(hash, "state").filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let decoded =
        urlencoding::decode(raw).map_err(|err| EditorError::MalformedState(err.to_string()))?;
    match serde_json::from_str::<Value>(&decoded) {
        Ok(Value::Object(state)) => Ok(Some(state)),
        Ok(other) => Err(EditorError::MalformedState(format!(
            "state is not an object: {other}"
        ))),
        Err(err) => Err(EditorError::MalformedState(err.to_string())),
    }
}

/// Seconds in `expires_in`; anything non-numeric counts as zero.
pub fn expires_in_secs(hash: &str) -> i64 {
    hash_param(hash, "expires_in")
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite())
        .map(|secs| secs as i64)
        .unwrap_or(0)
}
