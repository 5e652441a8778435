//! Page-load scoped instrumentation state.
//!
//! Both fields are written at most once per page load and read many times
//! afterwards; `reset` starts a new page load.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::CustomPropertyDefinition;

#[derive(Debug, Default)]
pub struct InstrumentationSession {
    custom_properties: RwLock<Option<Arc<[CustomPropertyDefinition]>>>,
    editor_injected: AtomicBool,
}

impl InstrumentationSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Installs the custom property rules for this page load. Returns `false`
    /// when a set was already installed; the existing set is kept.
    pub fn install_custom_properties(&self, definitions: Vec<CustomPropertyDefinition>) -> bool {
        let mut slot = self.custom_properties.write();
        if slot.is_some() {
            warn!(
                target: "autotrack.session",
                "custom properties already installed for this page load"
            );
            return false;
        }
        debug!(
            target: "autotrack.session",
            count = definitions.len(),
            "custom properties installed"
        );
        *slot = Some(definitions.into());
        true
    }

    /// Current rules, empty until installed.
    pub fn custom_properties(&self) -> Arc<[CustomPropertyDefinition]> {
        self.custom_properties
            .read()
            .clone()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn editor_injected(&self) -> bool {
        self.editor_injected.load(Ordering::SeqCst)
    }

    /// Flips the one-shot editor flag. Returns `true` only for the first caller.
    pub fn mark_editor_injected(&self) -> bool {
        self.editor_injected
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn reset(&self) {
        *self.custom_properties.write() = None;
        self.editor_injected.store(false, Ordering::SeqCst);
    }
}
