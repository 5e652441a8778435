//! Closed element-kind dispatch and small traversal helpers.

use crate::ports::{DocumentPort, NodeId};

/// `type` of an `<input>`, lower-cased; missing means `text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputType {
    Text,
    Button,
    Submit,
    Checkbox,
    Radio,
    Hidden,
    Password,
    Other(String),
}

impl InputType {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return InputType::Text;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "text" => InputType::Text,
            "button" => InputType::Button,
            "submit" => InputType::Submit,
            "checkbox" => InputType::Checkbox,
            "radio" => InputType::Radio,
            "hidden" => InputType::Hidden,
            "password" => InputType::Password,
            other => InputType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InputType::Text => "text",
            InputType::Button => "button",
            InputType::Submit => "submit",
            InputType::Checkbox => "checkbox",
            InputType::Radio => "radio",
            InputType::Hidden => "hidden",
            InputType::Password => "password",
            InputType::Other(other) => other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Form,
    Input(InputType),
    Select { multiple: bool },
    Textarea,
    Other,
}

impl ElementKind {
    /// `None` when the node is not an element.
    pub fn of<D>(doc: &D, node: NodeId) -> Option<ElementKind>
    where
        D: DocumentPort + ?Sized,
    {
        if !doc.is_element(node) {
            return None;
        }
        let tag = tag_lower(doc, node)?;
        let kind = match tag.as_str() {
            "form" => ElementKind::Form,
            "input" => ElementKind::Input(InputType::parse(doc.attribute(node, "type").as_deref())),
            "select" => ElementKind::Select {
                multiple: doc.attribute(node, "multiple").is_some(),
            },
            "textarea" => ElementKind::Textarea,
            _ => ElementKind::Other,
        };
        Some(kind)
    }

    /// Input, select and textarea carry a form value.
    pub fn is_form_field(&self) -> bool {
        matches!(
            self,
            ElementKind::Input(_) | ElementKind::Select { .. } | ElementKind::Textarea
        )
    }

    /// Field kind as understood by the value sanitizer.
    pub fn field_type(&self) -> &str {
        match self {
            ElementKind::Input(input) => input.as_str(),
            ElementKind::Select { multiple: true } => "select-multiple",
            ElementKind::Select { multiple: false } => "select-one",
            ElementKind::Textarea => "textarea",
            ElementKind::Form | ElementKind::Other => "",
        }
    }
}

pub fn tag_lower<D>(doc: &D, node: NodeId) -> Option<String>
where
    D: DocumentPort + ?Sized,
{
    doc.tag_name(node).map(|tag| tag.to_ascii_lowercase())
}

pub fn class_list<D>(doc: &D, node: NodeId) -> Vec<String>
where
    D: DocumentPort + ?Sized,
{
    doc.class_name(node)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub fn has_class<D>(doc: &D, node: NodeId, class: &str) -> bool
where
    D: DocumentPort + ?Sized,
{
    doc.class_name(node).split_whitespace().any(|c| c == class)
}

/// Strict descendants in tree order.
pub fn descendants<D>(doc: &D, root: NodeId) -> Vec<NodeId>
where
    D: DocumentPort + ?Sized,
{
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = doc.children(root).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(doc.children(node).into_iter().rev());
    }
    out
}
