use std::collections::BTreeMap;

use autotrack_core_types::Properties;
use autotrack_dom::{DocumentPort, NodeId};
use autotrack_privacy::FieldValue;

use crate::envelope::FORM_FIELD_PREFIX;
use crate::fingerprint::{field_name, form_field_value};

/// One `form_field-<name>` entry per named control of `form`. Controls that
/// share a name are merged in tree order.
pub fn form_field_properties(doc: &dyn DocumentPort, form: NodeId) -> Properties {
    let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
    let mut order = Vec::new();
    for control in doc.form_elements(form) {
        let Some(name) = field_name(doc, control) else {
            continue;
        };
        let Some(value) = form_field_value(doc, control) else {
            continue;
        };
        let merged = match fields.remove(&name) {
            Some(previous) => previous.merge(value),
            None => {
                order.push(name.clone());
                value
            }
        };
        fields.insert(name, merged);
    }

    let mut props = Properties::new();
    for name in order {
        if let Some(value) = fields.remove(&name) {
            props.insert(format!("{FORM_FIELD_PREFIX}{name}"), value.into());
        }
    }
    props
}
