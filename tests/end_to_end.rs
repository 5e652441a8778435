mod common;

use std::sync::Arc;

use autotrack::capture::{EventKind, RawEvent};
use autotrack::core_types::CustomPropertyDefinition;
use autotrack::dom::{DocumentPort, MemoryDocument, NodeId, PageInfo};
use autotrack::{InitOutcome, StaticDecideClient};
use common::Harness;
use pretty_assertions::assert_eq;
use serde_json::json;

fn shop_page() -> MemoryDocument {
    MemoryDocument::new(PageInfo::new("shop.example.com", "/checkout").with_title("Checkout"))
}

fn find(doc: &MemoryDocument, selector: &str) -> NodeId {
    doc.query_selector_all(selector).unwrap()[0]
}

#[tokio::test]
async fn click_inside_anchor_emits_one_event() {
    let mut doc = shop_page();
    let body = doc.body_id();
    let link = doc.element(body, "a", &[("href", "/cart"), ("id", "cart-link")]);
    let span = doc.element(link, "span", &[("class", "label")]);
    doc.append_text(span, "Cart");

    let harness = Harness::plain();
    let autotrack = harness.autotrack(Arc::new(doc), Arc::new(StaticDecideClient::enabled(vec![])));
    assert_eq!(autotrack.initialize().await, InitOutcome::Enabled);
    harness.sink.take(); // pageview

    assert!(autotrack.handle_event(&RawEvent::new(EventKind::Click, span)));
    let events = harness.sink.take();
    assert_eq!(events.len(), 1);
    let props = &events[0].properties;

    let index = props["calculatedTargetIndex"].as_i64().unwrap() as usize;
    let elements = props["elements"].as_array().unwrap();
    assert_eq!(elements[index]["tag_name"], json!("A"));
    assert_eq!(elements[index]["attr__id"], json!("cart-link"));
    assert_eq!(props["element-tag_name"], json!("A"));
    assert_eq!(props["element-text"], json!("Cart"));
    assert_eq!(props["host"], json!("shop.example.com"));
}

#[tokio::test]
async fn form_submit_merges_repeated_fields() {
    let mut doc = shop_page();
    let body = doc.body_id();
    let form = doc.element(body, "form", &[("id", "prefs")]);
    doc.element(form, "input", &[("name", "color"), ("value", "red")]);
    doc.element(form, "input", &[("name", "color"), ("value", "blue")]);
    doc.element(form, "input", &[("type", "password"), ("name", "pw"), ("value", "hunter2")]);
    doc.element(form, "input", &[("type", "submit"), ("value", "Save")]);

    let harness = Harness::plain();
    let autotrack = harness.autotrack(Arc::new(doc), Arc::new(StaticDecideClient::enabled(vec![])));
    autotrack.initialize().await;
    harness.sink.take();

    assert!(autotrack.handle_event(&RawEvent::new(EventKind::Submit, form)));
    let events = harness.sink.take();
    let props = &events[0].properties;
    assert_eq!(props["form_field-color"], json!(["red", "blue"]));
    assert_eq!(props["form_field-pw"], json!("[stripped]"));
    assert_eq!(props["event_type"], json!("submit"));
}

#[tokio::test]
async fn ineligible_and_opted_out_events_are_dropped() {
    let mut doc = shop_page();
    let body = doc.body_id();
    let button = doc.element(body, "button", &[]);
    let input = doc.element(body, "input", &[("name", "q")]);
    let private = doc.element(body, "button", &[("class", "mp-no-track")]);
    let doc = Arc::new(doc);

    let harness = Harness::plain();
    let autotrack = harness.autotrack(doc.clone(), Arc::new(StaticDecideClient::enabled(vec![])));
    autotrack.initialize().await;
    harness.sink.take();

    assert!(!autotrack.handle_event(&RawEvent::new(EventKind::Change, button)));
    assert!(!autotrack.handle_event(&RawEvent::new(EventKind::Click, input)));
    assert!(!autotrack.handle_event(&RawEvent::new(EventKind::Click, private)));
    assert!(!autotrack.handle_event(&RawEvent::new(EventKind::Click, body)));
    assert!(harness.sink.is_empty());

    assert!(autotrack.handle_event(&RawEvent::new(EventKind::Change, input)));
    assert!(autotrack.handle_event(&RawEvent::new(EventKind::Click, button)));
    assert_eq!(harness.sink.len(), 2);
}

#[tokio::test]
async fn custom_properties_from_decide_are_attached() {
    let mut doc = shop_page();
    let body = doc.body_id();
    let total = doc.element(body, "span", &[("id", "total")]);
    doc.append_text(total, "$19.99");
    let buy = doc.element(body, "button", &[("class", "buy")]);

    let harness = Harness::plain();
    let decide = StaticDecideClient::enabled(vec![CustomPropertyDefinition::new(
        "cart total",
        "#total",
        [".buy"],
    )]);
    let autotrack = harness.autotrack(Arc::new(doc), Arc::new(decide));
    autotrack.initialize().await;
    harness.sink.take();

    autotrack.handle_event(&RawEvent::new(EventKind::Click, buy));
    let events = harness.sink.take();
    assert_eq!(events[0].properties["cart total"], json!("$19.99"));
}

#[tokio::test]
async fn backoff_silences_events_until_expiry() {
    let mut doc = shop_page();
    let body = doc.body_id();
    let button = doc.element(body, "button", &[]);

    let harness = Harness::plain();
    let autotrack = harness.autotrack(Arc::new(doc), Arc::new(StaticDecideClient::enabled(vec![])));
    autotrack.initialize().await;
    harness.sink.take();

    let headers = std::collections::HashMap::from([(
        "X-MP-CE-Backoff".to_string(),
        "10".to_string(),
    )]);
    assert_eq!(autotrack.apply_backoff(&headers), Some(10));
    assert!(!autotrack.handle_event(&RawEvent::new(EventKind::Click, button)));

    harness.clock.advance_ms(10_000);
    assert!(autotrack.handle_event(&RawEvent::new(EventKind::Click, button)));
}

#[tokio::test]
async fn legacy_and_text_targets_are_normalized() {
    let mut doc = shop_page();
    let body = doc.body_id();
    let button = doc.element(body, "button", &[]);
    let text = doc.append_text(button, "Go");
    let doc = Arc::new(doc);

    let harness = Harness::plain();
    let autotrack = harness.autotrack(doc.clone(), Arc::new(StaticDecideClient::enabled(vec![])));
    autotrack.initialize().await;
    harness.sink.take();

    assert!(autotrack.handle_event(&RawEvent::legacy(EventKind::Click, text)));
    let events = harness.sink.take();
    assert_eq!(events[0].properties["elements"][0]["tag_name"], json!("BUTTON"));
    assert_eq!(find(&doc, "button"), button);
}
