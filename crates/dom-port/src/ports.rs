use serde::{Deserialize, Serialize};

use crate::errors::DomResult;

/// Handle to a node owned by the host document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
}

/// Location facts reported with every event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub host: String,
    pub pathname: String,
    #[serde(default)]
    pub title: String,
}

impl PageInfo {
    pub fn new(host: impl Into<String>, pathname: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            pathname: pathname.into(),
            title: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Document capability consumed by every autotrack component.
///
/// Implementations only need to answer structural questions; nothing here
/// mutates the tree.
pub trait DocumentPort: Send + Sync {
    fn document(&self) -> NodeId;

    fn body(&self) -> Option<NodeId>;

    fn node_type(&self, node: NodeId) -> Option<NodeType>;

    /// Tag name as the host reports it (upper-case for HTML elements).
    fn tag_name(&self, node: NodeId) -> Option<String>;

    /// Attributes in document order.
    fn attributes(&self, node: NodeId) -> Vec<(String, String)>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.attributes(node)
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    fn class_name(&self, node: NodeId) -> String {
        self.attribute(node, "class").unwrap_or_default()
    }

    fn text_content(&self, node: NodeId) -> Option<String>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Hosts with a native accessor should override this; the default walks
    /// `previous_sibling` and skips non-element nodes.
    fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        scan_previous_element(self, node)
    }

    /// Live form value of an input, select, textarea, option or button.
    fn value(&self, node: NodeId) -> Option<String>;

    fn checked(&self, node: NodeId) -> bool;

    /// Controls owned by a form, in tree order.
    fn form_elements(&self, form: NodeId) -> Vec<NodeId> {
        crate::element::descendants(self, form)
            .into_iter()
            .filter(|node| {
                crate::element::tag_lower(self, *node).is_some_and(|tag| {
                    matches!(
                        tag.as_str(),
                        "input" | "select" | "textarea" | "button" | "fieldset" | "output" | "object"
                    )
                })
            })
            .collect()
    }

    fn query_selector_all(&self, selector: &str) -> DomResult<Vec<NodeId>>;

    /// Whether the host can evaluate selectors at all.
    fn supports_query(&self) -> bool {
        true
    }

    fn page(&self) -> PageInfo;

    fn is_element(&self, node: NodeId) -> bool {
        self.node_type(node) == Some(NodeType::Element)
    }
}

pub(crate) fn scan_previous_element<D>(doc: &D, node: NodeId) -> Option<NodeId>
where
    D: DocumentPort + ?Sized,
{
    let mut cursor = doc.previous_sibling(node);
    while let Some(candidate) = cursor {
        if doc.is_element(candidate) {
            return Some(candidate);
        }
        cursor = doc.previous_sibling(candidate);
    }
    None
}
