//! Redaction policy for form field values.
//!
//! Rules are evaluated in order; explicit marker classes win over every
//! content heuristic, and anything unmatched passes through unchanged.

use crate::patterns::{is_sensitive_name, looks_like_credit_card, looks_like_ssn};
use crate::value::FieldValue;

/// Replacement for redacted values.
pub const STRIPPED: &str = "[stripped]";
pub const NEVER_STRIP_CLASS: &str = "mp-never-strip-value";
pub const ALWAYS_STRIP_CLASS: &str = "mp-always-strip-value";

/// What the policy needs to know about the field a value came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldDescriptor<'a> {
    /// Input `type` (or the element's field kind); matched case-insensitively.
    pub kind: &'a str,
    /// `name` attribute, falling back to `id`.
    pub name_or_id: Option<&'a str>,
    /// Raw class attribute.
    pub class_name: &'a str,
}

impl<'a> FieldDescriptor<'a> {
    pub fn new(kind: &'a str, name_or_id: Option<&'a str>, class_name: &'a str) -> Self {
        Self {
            kind,
            name_or_id,
            class_name,
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.class_name.split_whitespace().any(|c| c == class)
    }
}

pub fn sanitize(field: &FieldDescriptor<'_>, value: FieldValue) -> FieldValue {
    if field.has_class(NEVER_STRIP_CLASS) {
        return value;
    }
    if field.has_class(ALWAYS_STRIP_CLASS) {
        return stripped();
    }

    if field.kind.eq_ignore_ascii_case("hidden") || field.kind.eq_ignore_ascii_case("password") {
        return stripped();
    }

    if field.name_or_id.is_some_and(is_sensitive_name) {
        return stripped();
    }

    if let Some(text) = value.as_text() {
        if looks_like_credit_card(text) || looks_like_ssn(text) {
            return stripped();
        }
    }

    value
}

fn stripped() -> FieldValue {
    FieldValue::Text(STRIPPED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_field() -> FieldDescriptor<'static> {
        FieldDescriptor::new("text", Some("comment"), "")
    }

    #[test]
    fn never_strip_marker_wins() {
        let field = FieldDescriptor::new("password", Some("cc-number"), "wide mp-never-strip-value");
        assert_eq!(
            sanitize(&field, "4111111111111111".into()),
            FieldValue::text("4111111111111111")
        );
    }

    #[test]
    fn always_strip_marker() {
        let field = FieldDescriptor::new("text", Some("greeting"), "mp-always-strip-value");
        assert_eq!(sanitize(&field, "hello".into()), FieldValue::text(STRIPPED));
    }

    #[test]
    fn never_beats_always() {
        let field = FieldDescriptor::new(
            "text",
            None,
            "mp-always-strip-value mp-never-strip-value",
        );
        assert_eq!(sanitize(&field, "hello".into()), FieldValue::text("hello"));
    }

    #[test]
    fn hidden_and_password_are_stripped() {
        for kind in ["hidden", "PASSWORD"] {
            let field = FieldDescriptor::new(kind, Some("token"), "");
            assert_eq!(sanitize(&field, "abc".into()), FieldValue::text(STRIPPED));
        }
    }

    #[test]
    fn sensitive_names_are_stripped() {
        let field = FieldDescriptor::new("text", Some("billing_cvv"), "");
        assert_eq!(sanitize(&field, "123".into()), FieldValue::text(STRIPPED));
    }

    #[test]
    fn content_heuristics() {
        assert_eq!(
            sanitize(&text_field(), "4111111111111111".into()),
            FieldValue::text(STRIPPED)
        );
        assert_eq!(
            sanitize(&text_field(), "078-05-1120".into()),
            FieldValue::text(STRIPPED)
        );
        assert_eq!(
            sanitize(&text_field(), "hello world".into()),
            FieldValue::text("hello world")
        );
    }

    #[test]
    fn lists_skip_content_heuristics() {
        let list = FieldValue::List(vec!["4111111111111111".into()]);
        assert_eq!(sanitize(&text_field(), list.clone()), list);
    }

    #[test]
    fn idempotent() {
        let fields = [
            text_field(),
            FieldDescriptor::new("password", None, ""),
            FieldDescriptor::new("text", Some("ssn"), ""),
            FieldDescriptor::new("text", None, "mp-always-strip-value"),
            FieldDescriptor::new("text", None, "mp-never-strip-value"),
        ];
        let values = ["hello", "4111 1111 1111 1111", "123-45-6789", STRIPPED, ""];
        for field in &fields {
            for value in values {
                let once = sanitize(field, value.into());
                let twice = sanitize(field, once.clone());
                assert_eq!(once, twice);
            }
        }
    }
}
