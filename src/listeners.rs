use autotrack_capture::EventKind;
use parking_lot::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerPhase {
    Capture,
    Bubble,
}

/// Host-side registration of the document-level delegated listeners. The
/// host forwards matching events to `Autotrack::handle_event`.
pub trait ListenerRegistry: Send + Sync {
    fn add_listener(&self, kind: EventKind, phase: ListenerPhase);
}

#[derive(Default)]
pub struct RecordingListenerRegistry {
    registered: Mutex<Vec<(EventKind, ListenerPhase)>>,
}

impl RecordingListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registered(&self) -> Vec<(EventKind, ListenerPhase)> {
        self.registered.lock().clone()
    }
}

impl ListenerRegistry for RecordingListenerRegistry {
    fn add_listener(&self, kind: EventKind, phase: ListenerPhase) {
        self.registered.lock().push((kind, phase));
    }
}
