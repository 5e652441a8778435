//! Structural description of a single element.

use std::collections::BTreeMap;

use autotrack_core_types::Properties;
use autotrack_dom::{class_list, descendants, tag_lower, DocumentPort, ElementKind, InputType, NodeId};
use autotrack_privacy::{sanitize, FieldDescriptor, FieldValue};
use serde::Serialize;
use serde_json::Value;

pub const ATTRIBUTE_PREFIX: &str = "attr__";
pub const MAX_TEXT_CHARS: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ElementFingerprint {
    pub tag_name: String,
    pub classes: Vec<String>,
    /// Keys already carry [`ATTRIBUTE_PREFIX`].
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    pub nth_child: u32,
    pub nth_of_type: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
}

impl ElementFingerprint {
    pub fn to_properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("tag_name".into(), Value::from(self.tag_name.as_str()));
        props.insert(
            "classes".into(),
            Value::Array(self.classes.iter().map(|c| Value::from(c.as_str())).collect()),
        );
        for (key, value) in &self.attributes {
            props.insert(key.clone(), Value::from(value.as_str()));
        }
        props.insert("nth_child".into(), Value::from(self.nth_child));
        props.insert("nth_of_type".into(), Value::from(self.nth_of_type));
        if let Some(text) = &self.text {
            props.insert("text".into(), Value::from(text.as_str()));
        }
        if let Some(value) = &self.value {
            props.insert("value".into(), value.clone().into());
        }
        props
    }

    /// Fields reported for the calculated target: everything except the class
    /// list (in either form) and the sibling positions.
    pub fn reportable_fields(&self) -> Properties {
        let mut props = self.to_properties();
        for key in ["classes", "attr__class", "nth_child", "nth_of_type"] {
            props.remove(key);
        }
        props
    }
}

pub fn fingerprint(doc: &dyn DocumentPort, node: NodeId, include_text: bool) -> ElementFingerprint {
    let tag_name = doc.tag_name(node).unwrap_or_default();
    let attributes = doc
        .attributes(node)
        .into_iter()
        .map(|(name, value)| (format!("{ATTRIBUTE_PREFIX}{name}"), value))
        .collect();
    let text = include_text.then(|| safe_text(doc.text_content(node).as_deref().unwrap_or("")));
    let value = match ElementKind::of(doc, node) {
        Some(kind) if kind.is_form_field() => form_field_value(doc, node),
        _ => None,
    };
    let (nth_child, nth_of_type) = sibling_position(doc, node, &tag_name);

    ElementFingerprint {
        tag_name,
        classes: class_list(doc, node),
        attributes,
        nth_child,
        nth_of_type,
        text,
        value,
    }
}

/// Sanitized value of a form control, `None` when it contributes nothing
/// (unchecked checkbox or radio).
pub fn form_field_value(doc: &dyn DocumentPort, node: NodeId) -> Option<FieldValue> {
    let kind = ElementKind::of(doc, node)?;
    let raw = match &kind {
        ElementKind::Input(InputType::Checkbox) => doc
            .checked(node)
            .then(|| FieldValue::List(vec![doc.value(node).unwrap_or_default()])),
        ElementKind::Input(InputType::Radio) => doc
            .checked(node)
            .then(|| FieldValue::Text(doc.value(node).unwrap_or_default())),
        ElementKind::Input(_) => Some(FieldValue::Text(doc.value(node).unwrap_or_default())),
        ElementKind::Select { multiple: true } => Some(FieldValue::List(selected_options(doc, node))),
        ElementKind::Select { multiple: false } => {
            Some(FieldValue::Text(doc.value(node).unwrap_or_default()))
        }
        ElementKind::Textarea | ElementKind::Form | ElementKind::Other => {
            let value = doc
                .value(node)
                .filter(|value| !value.is_empty())
                .or_else(|| doc.text_content(node))
                .unwrap_or_default();
            Some(FieldValue::Text(value))
        }
    }?;

    let name_or_id = field_name(doc, node);
    let class_name = doc.class_name(node);
    let field = FieldDescriptor::new(kind.field_type(), name_or_id.as_deref(), &class_name);
    Some(sanitize(&field, raw))
}

/// `name` attribute, else `id`; empty strings count as missing.
pub(crate) fn field_name(doc: &dyn DocumentPort, node: NodeId) -> Option<String> {
    doc.attribute(node, "name")
        .filter(|name| !name.is_empty())
        .or_else(|| doc.attribute(node, "id").filter(|id| !id.is_empty()))
}

fn selected_options(doc: &dyn DocumentPort, select: NodeId) -> Vec<String> {
    descendants(doc, select)
        .into_iter()
        .filter(|option| {
            tag_lower(doc, *option).as_deref() == Some("option")
                && doc.attribute(*option, "selected").is_some()
        })
        .map(|option| doc.value(option).unwrap_or_default())
        .collect()
}

fn safe_text(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .chars()
        .take(MAX_TEXT_CHARS)
        .collect()
}

fn sibling_position(doc: &dyn DocumentPort, node: NodeId, tag_name: &str) -> (u32, u32) {
    let mut nth_child = 1;
    let mut nth_of_type = 1;
    let mut cursor = doc.previous_element_sibling(node);
    while let Some(sibling) = cursor {
        nth_child += 1;
        if doc.tag_name(sibling).as_deref() == Some(tag_name) {
            nth_of_type += 1;
        }
        cursor = doc.previous_element_sibling(sibling);
    }
    (nth_child, nth_of_type)
}
