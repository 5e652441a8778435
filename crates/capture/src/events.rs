use std::fmt;

use autotrack_dom::{DocumentPort, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// DOM event types the delegated listeners are registered for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Click,
    Change,
    Submit,
    Other(String),
}

impl EventKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "click" => EventKind::Click,
            "change" => EventKind::Change,
            "submit" => EventKind::Submit,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Click => "click",
            EventKind::Change => "change",
            EventKind::Submit => "submit",
            EventKind::Other(other) => other,
        }
    }

    /// The three kinds listeners are attached for.
    pub fn delegated() -> [EventKind; 3] {
        [EventKind::Submit, EventKind::Change, EventKind::Click]
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        EventKind::parse(&value)
    }
}

impl From<EventKind> for String {
    fn from(value: EventKind) -> Self {
        value.as_str().to_string()
    }
}

/// An interaction as delivered by the host. Legacy hosts report the target as
/// `src_element` instead of `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub target: Option<NodeId>,
    pub src_element: Option<NodeId>,
}

impl RawEvent {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target: Some(target),
            src_element: None,
        }
    }

    pub fn legacy(kind: EventKind, src_element: NodeId) -> Self {
        Self {
            kind,
            target: None,
            src_element: Some(src_element),
        }
    }

    /// Concrete target: `target`, else `src_element`; text nodes resolve to
    /// their parent.
    pub fn resolve_target(&self, doc: &dyn DocumentPort) -> Option<NodeId> {
        let node = self.target.or(self.src_element)?;
        if doc.node_type(node) == Some(NodeType::Text) {
            return doc.parent(node);
        }
        Some(node)
    }
}

pub(crate) fn emit_skipped(kind: &EventKind, reason: &'static str) {
    debug!(target: "autotrack.capture", event = %kind, reason, "capture.skipped");
}

pub(crate) fn emit_captured(kind: &EventKind, element_count: usize, calculated_index: i64) {
    debug!(
        target: "autotrack.capture",
        event = %kind,
        element_count,
        calculated_index,
        "capture.completed"
    );
}
