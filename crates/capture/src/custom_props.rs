//! Server-declared properties read out of the live document.

use autotrack_core_types::{CustomPropertyDefinition, Properties};
use autotrack_dom::{tag_lower, DocumentPort, NodeId};
use serde_json::Value;
use tracing::warn;

use crate::errors::CaptureResult;

/// Evaluates every definition triggered by an element of `chain`. A selector
/// the document cannot evaluate only disables the rule it belongs to.
pub fn extract(
    doc: &dyn DocumentPort,
    definitions: &[CustomPropertyDefinition],
    chain: &[NodeId],
) -> Properties {
    let mut props = Properties::new();
    for definition in definitions {
        for event_selector in &definition.event_selectors {
            let triggered = match doc.query_selector_all(event_selector) {
                Ok(matches) => matches.iter().any(|node| chain.contains(node)),
                Err(err) => {
                    warn!(
                        target: "autotrack.capture",
                        property = %definition.name,
                        selector = %event_selector,
                        error = %err,
                        "custom property trigger skipped"
                    );
                    false
                }
            };
            if !triggered {
                continue;
            }
            match evaluate(doc, definition) {
                Ok(value) => {
                    props.insert(definition.name.clone(), Value::String(value));
                }
                Err(err) => warn!(
                    target: "autotrack.capture",
                    property = %definition.name,
                    error = %err,
                    "custom property skipped"
                ),
            }
        }
    }
    props
}

/// Joined values of every element matching the definition's own selector.
pub fn evaluate(doc: &dyn DocumentPort, definition: &CustomPropertyDefinition) -> CaptureResult<String> {
    let mut values = Vec::new();
    for node in doc.query_selector_all(&definition.css_selector)? {
        match tag_lower(doc, node).as_deref() {
            Some("input" | "select") => values.push(doc.value(node).unwrap_or_default()),
            _ => {
                if let Some(text) = doc.text_content(node).filter(|text| !text.is_empty()) {
                    values.push(text);
                }
            }
        }
    }
    Ok(values.join(", "))
}
