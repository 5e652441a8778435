//! Nearest interactive ancestor lookup.

use crate::element::tag_lower;
use crate::ports::{DocumentPort, NodeId};

/// Given an event target, finds the element a user most plausibly meant to
/// interact with (e.g. the `<a>` around a clicked `<span>`).
pub trait InteractiveResolver: Send + Sync {
    /// Returns the nearest interactive ancestor, inclusive, or `node` itself.
    fn nearest_interactive(&self, doc: &dyn DocumentPort, node: NodeId) -> NodeId;
}

const INTERACTIVE_TAGS: &[&str] = &[
    "a", "button", "input", "select", "textarea", "label", "option", "summary",
];

const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "checkbox", "menuitem", "tab", "option", "radio", "switch",
];

/// Tag and ARIA role based resolver. Stops below `<body>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagInteractiveResolver;

impl TagInteractiveResolver {
    fn is_interactive(doc: &dyn DocumentPort, node: NodeId) -> bool {
        if tag_lower(doc, node).is_some_and(|tag| INTERACTIVE_TAGS.contains(&tag.as_str())) {
            return true;
        }
        doc.attribute(node, "role")
            .is_some_and(|role| INTERACTIVE_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()))
    }
}

impl InteractiveResolver for TagInteractiveResolver {
    fn nearest_interactive(&self, doc: &dyn DocumentPort, node: NodeId) -> NodeId {
        let body = doc.body();
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if Some(current) == body || !doc.is_element(current) {
                break;
            }
            if Self::is_interactive(doc, current) {
                return current;
            }
            cursor = doc.parent(current);
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use crate::ports::PageInfo;

    #[test]
    fn climbs_to_anchor() {
        let mut doc = MemoryDocument::new(PageInfo::default());
        let body = doc.body_id();
        let a = doc.element(body, "a", &[("href", "/pricing")]);
        let outer = doc.append_element(a, "span");
        let inner = doc.append_element(outer, "span");
        assert_eq!(TagInteractiveResolver.nearest_interactive(&doc, inner), a);
    }

    #[test]
    fn honours_roles_and_falls_back_to_node() {
        let mut doc = MemoryDocument::new(PageInfo::default());
        let body = doc.body_id();
        let card = doc.element(body, "div", &[("role", "Button")]);
        let label = doc.append_element(card, "em");
        let plain = doc.append_element(body, "p");
        assert_eq!(TagInteractiveResolver.nearest_interactive(&doc, label), card);
        assert_eq!(TagInteractiveResolver.nearest_interactive(&doc, plain), plain);
    }
}
