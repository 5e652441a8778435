//! Fixed keys of the emitted event and its default fields.

use autotrack_core_types::Properties;
use autotrack_dom::PageInfo;
use serde_json::Value;

pub const EVENT_NAME: &str = "$web_event";
pub const CE_VERSION: i64 = 1;

pub const EVENT_TYPE_KEY: &str = "event_type";
pub const CE_VERSION_KEY: &str = "ce_version";
pub const HOST_KEY: &str = "host";
pub const PATHNAME_KEY: &str = "pathname";
pub const TITLE_KEY: &str = "title";

pub const CALCULATED_TARGET_INDEX_KEY: &str = "calculatedTargetIndex";
pub const ELEMENTS_KEY: &str = "elements";
/// Index reported when the calculated target is not in the ancestor chain.
pub const OUTSIDE_CHAIN: i64 = -1;

pub const ELEMENT_PREFIX: &str = "element-";
pub const FORM_FIELD_PREFIX: &str = "form_field-";

pub const NO_TRACK_CLASS: &str = "mp-no-track";

pub const PAGEVIEW: &str = "pageview";

pub fn default_properties(event_type: &str, page: &PageInfo) -> Properties {
    let mut props = Properties::new();
    props.insert(EVENT_TYPE_KEY.into(), Value::from(event_type));
    props.insert(CE_VERSION_KEY.into(), Value::from(CE_VERSION));
    props.insert(HOST_KEY.into(), Value::from(page.host.as_str()));
    props.insert(PATHNAME_KEY.into(), Value::from(page.pathname.as_str()));
    props
}

/// Properties of the implicit pageview emitted once tracking is enabled.
pub fn pageview_properties(page: &PageInfo) -> Properties {
    let mut props = default_properties(PAGEVIEW, page);
    props.insert(TITLE_KEY.into(), Value::from(page.title.as_str()));
    props
}
