//! Turns a raw DOM interaction into a single `$web_event` property map.

pub mod classify;
pub mod custom_props;
pub mod envelope;
pub mod errors;
pub mod events;
pub mod fingerprint;
pub mod form;
pub mod tracker;

pub use classify::should_track;
pub use envelope::{default_properties, pageview_properties, EVENT_NAME};
pub use errors::{CaptureError, CaptureResult};
pub use events::{EventKind, RawEvent};
pub use fingerprint::{fingerprint, form_field_value, ElementFingerprint};
pub use tracker::InteractionTracker;
