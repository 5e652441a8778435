use autotrack_dom::{DocumentPort, ElementKind, InputType, NodeId};

use crate::events::EventKind;

/// Whether `kind` on `node` is an interaction worth reporting.
pub fn should_track(doc: &dyn DocumentPort, node: Option<NodeId>, kind: &EventKind) -> bool {
    let Some(element) = node.and_then(|node| ElementKind::of(doc, node)) else {
        return false;
    };
    let expected = match element {
        ElementKind::Form => EventKind::Submit,
        ElementKind::Input(InputType::Button | InputType::Submit) => EventKind::Click,
        ElementKind::Input(_) | ElementKind::Select { .. } | ElementKind::Textarea => {
            EventKind::Change
        }
        ElementKind::Other => EventKind::Click,
    };
    *kind == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotrack_dom::{MemoryDocument, PageInfo};

    #[test]
    fn table() {
        let mut doc = MemoryDocument::new(PageInfo::default());
        let body = doc.body_id();
        let form = doc.element(body, "form", &[]);
        let text = doc.element(form, "input", &[]);
        let submit = doc.element(form, "input", &[("type", "submit")]);
        let select = doc.element(form, "select", &[]);
        let area = doc.element(form, "textarea", &[]);
        let button = doc.element(body, "button", &[]);
        let div = doc.element(body, "div", &[]);
        let comment = doc.append_comment(body, "x");

        let cases = [
            (form, EventKind::Submit, true),
            (form, EventKind::Click, false),
            (text, EventKind::Change, true),
            (text, EventKind::Click, false),
            (submit, EventKind::Click, true),
            (submit, EventKind::Change, false),
            (select, EventKind::Change, true),
            (area, EventKind::Change, true),
            (area, EventKind::Click, false),
            (button, EventKind::Click, true),
            (button, EventKind::Change, false),
            (div, EventKind::Click, true),
            (div, EventKind::Submit, false),
            (comment, EventKind::Click, false),
        ];
        for (node, kind, expected) in cases {
            assert_eq!(should_track(&doc, Some(node), &kind), expected, "{node:?} {kind}");
        }
        assert!(!should_track(&doc, None, &EventKind::Click));
    }
}
