//! Arena-backed in-memory document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::element::tag_lower;
use crate::errors::DomResult;
use crate::ports::{DocumentPort, NodeId, NodeType, PageInfo};
use crate::selector::SelectorList;

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
    value: Option<String>,
    checked: Option<bool>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Declarative description of a subtree, used by fixtures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Text-only node when `tag` is absent, otherwise a leading text child.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    html: NodeId,
    head: Option<NodeId>,
    body: Option<NodeId>,
    page: PageInfo,
    query_supported: bool,
}

impl MemoryDocument {
    /// Document with `<html>`, `<head>` and `<body>`.
    pub fn new(page: PageInfo) -> Self {
        let mut doc = Self::without_body(page);
        let html = doc.html;
        doc.head = Some(doc.append_element(html, "head"));
        doc.attach_body();
        doc
    }

    /// Document that has not parsed its `<body>` yet.
    pub fn without_body(page: PageInfo) -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            html: NodeId(0),
            head: None,
            body: None,
            page,
            query_supported: true,
        };
        doc.html = doc.append_element(NodeId(0), "html");
        doc
    }

    /// Builds a document whose `<body>` content is described by `spec`. A root
    /// spec tagged `body` contributes its attributes and children to the body.
    pub fn from_spec(page: PageInfo, spec: &NodeSpec) -> Self {
        let mut doc = Self::new(page);
        let body = doc.body_id();
        if spec.tag.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("body")) {
            for (key, value) in &spec.attrs {
                doc.set_attribute(body, key, value);
            }
            if let Some(text) = &spec.text {
                doc.append_text(body, text);
            }
            for child in &spec.children {
                doc.append_spec(body, child);
            }
        } else {
            doc.append_spec(body, spec);
        }
        doc
    }

    pub fn append_spec(&mut self, parent: NodeId, spec: &NodeSpec) -> NodeId {
        let Some(tag) = &spec.tag else {
            return self.append_text(parent, spec.text.as_deref().unwrap_or_default());
        };
        let node = self.append_element(parent, tag);
        for (key, value) in &spec.attrs {
            self.set_attribute(node, key, value);
        }
        if let Some(value) = &spec.value {
            self.set_value(node, value);
        }
        if let Some(checked) = spec.checked {
            self.set_checked(node, checked);
        }
        if let Some(text) = &spec.text {
            self.append_text(node, text);
        }
        for child in &spec.children {
            self.append_spec(node, child);
        }
        node
    }

    pub fn html_id(&self) -> NodeId {
        self.html
    }

    pub fn head_id(&self) -> Option<NodeId> {
        self.head
    }

    /// Body handle, or `<html>` while no body is attached.
    pub fn body_id(&self) -> NodeId {
        self.body.unwrap_or(self.html)
    }

    pub fn attach_body(&mut self) -> NodeId {
        if let Some(body) = self.body {
            return body;
        }
        let html = self.html;
        let body = self.append_element(html, "body");
        self.body = Some(body);
        body
    }

    pub fn set_query_supported(&mut self, supported: bool) {
        self.query_supported = supported;
    }

    pub fn set_page(&mut self, page: PageInfo) {
        self.page = page;
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.push(
            parent,
            NodeData::Element(ElementData {
                tag: tag.to_ascii_lowercase(),
                ..ElementData::default()
            }),
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeData::Text(text.to_string()))
    }

    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeData::Comment(text.to_string()))
    }

    /// Convenience for `append_element` followed by `set_attribute` calls.
    pub fn element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let node = self.append_element(parent, tag);
        for (key, value) in attrs {
            self.set_attribute(node, key, value);
        }
        node
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            let name = name.to_ascii_lowercase();
            match element.attrs.iter_mut().find(|(key, _)| *key == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => element.attrs.push((name, value.to_string())),
            }
        }
    }

    /// Sets the live value without touching the `value` attribute.
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element.value = Some(value.to_string());
        }
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(element) = self.element_mut(node) {
            element.checked = Some(checked);
        }
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        if let Some(parent) = self.nodes.get_mut(parent.0 as usize) {
            parent.children.push(id);
        }
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn element_data(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0 as usize)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element_data(id)?
            .attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(_) => {}
            NodeData::Document | NodeData::Element(_) => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn select_value(&self, select: NodeId) -> Option<String> {
        let options: Vec<NodeId> = crate::element::descendants(self, select)
            .into_iter()
            .filter(|node| tag_lower(self, *node).as_deref() == Some("option"))
            .collect();
        let chosen = options
            .iter()
            .copied()
            .find(|option| self.attr(*option, "selected").is_some())
            .or_else(|| options.first().copied())?;
        self.value(chosen)
    }
}

impl DocumentPort for MemoryDocument {
    fn document(&self) -> NodeId {
        NodeId(0)
    }

    fn body(&self) -> Option<NodeId> {
        self.body
    }

    fn node_type(&self, node: NodeId) -> Option<NodeType> {
        Some(match self.node(node)?.data {
            NodeData::Document => NodeType::Document,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
        })
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.element_data(node)
            .map(|element| element.tag.to_ascii_uppercase())
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.element_data(node)
            .map(|element| element.attrs.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.attr(node, name).map(str::to_string)
    }

    fn text_content(&self, node: NodeId) -> Option<String> {
        let data = &self.node(node)?.data;
        if matches!(data, NodeData::Document) {
            return None;
        }
        let mut out = String::new();
        match data {
            NodeData::Comment(text) => out.push_str(text),
            _ => self.collect_text(node, &mut out),
        }
        Some(out)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(self.node(node)?.parent?)?;
        let idx = parent.children.iter().position(|child| *child == node)?;
        idx.checked_sub(1).map(|prev| parent.children[prev])
    }

    fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(self.node(node)?.parent?)?;
        let idx = parent.children.iter().position(|child| *child == node)?;
        parent.children[..idx]
            .iter()
            .rev()
            .copied()
            .find(|sibling| self.element_data(*sibling).is_some())
    }

    fn value(&self, node: NodeId) -> Option<String> {
        let element = self.element_data(node)?;
        if let Some(value) = &element.value {
            return Some(value.clone());
        }
        match element.tag.as_str() {
            "select" => self.select_value(node),
            "textarea" => self.text_content(node),
            "option" => self
                .attr(node, "value")
                .map(str::to_string)
                .or_else(|| self.text_content(node).map(|t| t.trim().to_string())),
            "input" => {
                let kind = self.attr(node, "type").unwrap_or("text").to_ascii_lowercase();
                match self.attr(node, "value") {
                    Some(value) => Some(value.to_string()),
                    None if kind == "checkbox" || kind == "radio" => Some("on".to_string()),
                    None => Some(String::new()),
                }
            }
            _ => self.attr(node, "value").map(str::to_string),
        }
    }

    fn checked(&self, node: NodeId) -> bool {
        self.element_data(node)
            .and_then(|element| element.checked)
            .unwrap_or_else(|| self.attr(node, "checked").is_some())
    }

    fn query_selector_all(&self, selector: &str) -> DomResult<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(list.select_all(self, self.document()))
    }

    fn supports_query(&self) -> bool {
        self.query_supported
    }

    fn page(&self) -> PageInfo {
        self.page.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_spec() {
        let spec: NodeSpec = serde_json::from_value(serde_json::json!({
            "tag": "form",
            "attrs": {"id": "signup"},
            "children": [
                {"tag": "input", "attrs": {"name": "email", "value": "a@b.c"}},
                {"tag": "select", "attrs": {"name": "plan"}, "children": [
                    {"tag": "option", "attrs": {"value": "free"}},
                    {"tag": "option", "attrs": {"value": "pro", "selected": ""}}
                ]},
                {"tag": "textarea", "attrs": {"name": "note"}, "text": "hello"}
            ]
        }))
        .unwrap();
        let doc = MemoryDocument::from_spec(PageInfo::new("example.com", "/"), &spec);
        let form = doc.query_selector_all("#signup").unwrap()[0];
        let fields = doc.form_elements(form);
        assert_eq!(fields.len(), 3);
        assert_eq!(doc.value(fields[0]).as_deref(), Some("a@b.c"));
        assert_eq!(doc.value(fields[1]).as_deref(), Some("pro"));
        assert_eq!(doc.value(fields[2]).as_deref(), Some("hello"));
        assert_eq!(doc.tag_name(form).as_deref(), Some("FORM"));
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let mut doc = MemoryDocument::new(PageInfo::default());
        let body = doc.body_id();
        let a = doc.append_element(body, "a");
        doc.append_text(a, "Hello ");
        let b = doc.append_element(a, "b");
        doc.append_text(b, "You");
        doc.append_comment(a, "ignored");
        assert_eq!(doc.text_content(a).as_deref(), Some("Hello You"));
        assert_eq!(doc.text_content(doc.document()), None);
    }

    #[test]
    fn element_sibling_skips_text_and_comments() {
        let mut doc = MemoryDocument::new(PageInfo::default());
        let body = doc.body_id();
        let first = doc.append_element(body, "p");
        doc.append_text(body, "\n");
        doc.append_comment(body, "c");
        let second = doc.append_element(body, "p");
        assert_eq!(doc.previous_element_sibling(second), Some(first));
        assert_eq!(doc.previous_element_sibling(first), None);
        assert!(doc.previous_sibling(second).is_some());
    }

    #[test]
    fn checkbox_defaults() {
        let mut doc = MemoryDocument::new(PageInfo::default());
        let body = doc.body_id();
        let checkbox = doc.element(body, "input", &[("type", "checkbox"), ("checked", "")]);
        assert!(doc.checked(checkbox));
        assert_eq!(doc.value(checkbox).as_deref(), Some("on"));
        doc.set_checked(checkbox, false);
        assert!(!doc.checked(checkbox));
    }
}
