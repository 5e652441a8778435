//! Shared primitives for the autotrack workspace.
//!
//! Everything that more than one layer needs to agree on lives here: the
//! property map handed to the transport, the server-provided custom property
//! rules, the wall clock and the page-load scoped session.

pub mod clock;
pub mod session;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use clock::{Clock, FixedClock, SystemClock};
pub use session::InstrumentationSession;

/// Property mapping attached to an emitted event.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Shared error type for the thin seams between crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackError {
    #[error("{message}")]
    Message { message: String },
}

impl TrackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// A user-declared rule binding a selector's matched content to an event
/// property, triggered when one of `event_selectors` matches an element in the
/// interacted ancestor chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPropertyDefinition {
    pub name: String,
    pub css_selector: String,
    #[serde(default)]
    pub event_selectors: Vec<String>,
}

impl CustomPropertyDefinition {
    pub fn new(
        name: impl Into<String>,
        css_selector: impl Into<String>,
        event_selectors: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            css_selector: css_selector.into(),
            event_selectors: event_selectors.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_deserializes_without_event_selectors() {
        let def: CustomPropertyDefinition =
            serde_json::from_str(r##"{"name":"plan","css_selector":"#plan"}"##).unwrap();
        assert_eq!(def.name, "plan");
        assert!(def.event_selectors.is_empty());
    }
}
