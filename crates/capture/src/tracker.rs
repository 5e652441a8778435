//! Per-event pipeline: target resolution, eligibility, fingerprinting and
//! property assembly.

use std::sync::Arc;

use autotrack_core_types::{InstrumentationSession, Properties};
use autotrack_dom::{
    has_class, DocumentPort, ElementKind, InteractiveResolver, NodeId, TagInteractiveResolver,
};
use autotrack_event_sink::{EventSink, TrackedEvent};
use serde_json::Value;

use crate::classify::should_track;
use crate::custom_props;
use crate::envelope::{
    default_properties, CALCULATED_TARGET_INDEX_KEY, ELEMENTS_KEY, ELEMENT_PREFIX, EVENT_NAME,
    NO_TRACK_CLASS, OUTSIDE_CHAIN,
};
use crate::errors::CaptureResult;
use crate::events::{emit_captured, emit_skipped, EventKind, RawEvent};
use crate::fingerprint::fingerprint;
use crate::form::form_field_properties;

pub struct InteractionTracker {
    session: Arc<InstrumentationSession>,
    resolver: Arc<dyn InteractiveResolver>,
}

impl InteractionTracker {
    pub fn new(session: Arc<InstrumentationSession>) -> Self {
        Self::with_resolver(session, Arc::new(TagInteractiveResolver))
    }

    pub fn with_resolver(
        session: Arc<InstrumentationSession>,
        resolver: Arc<dyn InteractiveResolver>,
    ) -> Self {
        Self { session, resolver }
    }

    pub fn session(&self) -> &Arc<InstrumentationSession> {
        &self.session
    }

    /// Runs the pipeline and hands the result to `sink`. Returns whether an
    /// event was emitted.
    pub fn track(
        &self,
        doc: &dyn DocumentPort,
        event: &RawEvent,
        sink: &dyn EventSink,
    ) -> CaptureResult<bool> {
        let Some(properties) = self.build_properties(doc, event) else {
            return Ok(false);
        };
        sink.track(TrackedEvent::new(EVENT_NAME, properties))?;
        Ok(true)
    }

    /// Property map for `event`, or `None` when the event is not tracked.
    pub fn build_properties(&self, doc: &dyn DocumentPort, event: &RawEvent) -> Option<Properties> {
        let Some(target) = event.resolve_target(doc) else {
            emit_skipped(&event.kind, "no_target");
            return None;
        };
        if target == doc.document() || Some(target) == doc.body() || !doc.is_element(target) {
            emit_skipped(&event.kind, "not_an_element");
            return None;
        }

        let calculated = self.resolver.nearest_interactive(doc, target);
        if has_class(doc, target, NO_TRACK_CLASS) || has_class(doc, calculated, NO_TRACK_CLASS) {
            emit_skipped(&event.kind, "opted_out");
            return None;
        }

        let chain = ancestor_chain(doc, target);
        if !should_track(doc, Some(target), &event.kind) {
            emit_skipped(&event.kind, "not_tracked_for_kind");
            return None;
        }

        let elements: Vec<Value> = chain
            .iter()
            .enumerate()
            .map(|(idx, node)| Value::Object(fingerprint(doc, *node, idx == 0).to_properties()))
            .collect();
        let calculated_index = chain
            .iter()
            .position(|node| *node == calculated)
            .map_or(OUTSIDE_CHAIN, |idx| idx as i64);
        let calculated_fields = fingerprint(doc, calculated, true).reportable_fields();

        let form_fields = if event.kind == EventKind::Submit
            && ElementKind::of(doc, target) == Some(ElementKind::Form)
        {
            form_field_properties(doc, target)
        } else {
            Properties::new()
        };

        let definitions = self.session.custom_properties();
        let custom = custom_props::extract(doc, &definitions, &chain);

        let mut props = default_properties(event.kind.as_str(), &doc.page());
        props.insert(CALCULATED_TARGET_INDEX_KEY.into(), Value::from(calculated_index));
        let element_count = elements.len();
        props.insert(ELEMENTS_KEY.into(), Value::Array(elements));
        for (key, value) in calculated_fields {
            props.insert(format!("{ELEMENT_PREFIX}{key}"), value);
        }
        props.extend(form_fields);
        props.extend(custom);

        emit_captured(&event.kind, element_count, calculated_index);
        Some(props)
    }
}

/// `target` and its element ancestors, child first, stopping below `<body>`.
pub fn ancestor_chain(doc: &dyn DocumentPort, target: NodeId) -> Vec<NodeId> {
    let body = doc.body();
    let mut chain = vec![target];
    let mut current = target;
    while let Some(parent) = doc.parent(current) {
        if Some(parent) == body || !doc.is_element(parent) {
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain
}
