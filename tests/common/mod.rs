#![allow(dead_code)]

use std::sync::Arc;

use autotrack::core_types::{FixedClock, InstrumentationSession};
use autotrack::dom::DocumentPort;
use autotrack::editor::{MemoryLocation, MemorySessionStorage, RecordingEditorHost};
use autotrack::event_sink::InMemorySink;
use autotrack::gate::MemoryCookieJar;
use autotrack::{
    Autotrack, AutotrackConfig, AutotrackPorts, DecideClient, RecordingListenerRegistry,
};

pub const TOKEN: &str = "proj-token";
pub const NOW: i64 = 1_700_000_000_000;

pub struct Harness {
    pub session: Arc<InstrumentationSession>,
    pub sink: Arc<InMemorySink>,
    pub clock: Arc<FixedClock>,
    pub cookies: Arc<MemoryCookieJar>,
    pub location: Arc<MemoryLocation>,
    pub storage: Arc<MemorySessionStorage>,
    pub editor_host: Arc<RecordingEditorHost>,
    pub listeners: Arc<RecordingListenerRegistry>,
}

impl Harness {
    pub fn new(location: MemoryLocation, storage: MemorySessionStorage) -> Self {
        let clock = Arc::new(FixedClock::new(NOW));
        Self {
            session: InstrumentationSession::new(),
            sink: InMemorySink::new(32),
            cookies: Arc::new(MemoryCookieJar::new(clock.clone())),
            clock,
            location: Arc::new(location),
            storage: Arc::new(storage),
            editor_host: Arc::new(RecordingEditorHost::new()),
            listeners: Arc::new(RecordingListenerRegistry::new()),
        }
    }

    pub fn plain() -> Self {
        Self::new(MemoryLocation::new("/", ""), MemorySessionStorage::new())
    }

    pub fn autotrack(
        &self,
        document: Arc<dyn DocumentPort>,
        decide: Arc<dyn DecideClient>,
    ) -> Autotrack {
        let mut config = AutotrackConfig::with_token(TOKEN);
        config.readiness.retry_delay_ms = 1;
        config.readiness.max_attempts = 5;
        self.autotrack_with(config, document, decide)
    }

    pub fn autotrack_with(
        &self,
        config: AutotrackConfig,
        document: Arc<dyn DocumentPort>,
        decide: Arc<dyn DecideClient>,
    ) -> Autotrack {
        let ports = AutotrackPorts {
            document,
            sink: self.sink.clone(),
            cookies: self.cookies.clone(),
            location: self.location.clone(),
            storage: self.storage.clone(),
            editor_host: self.editor_host.clone(),
            decide,
            listeners: self.listeners.clone(),
            clock: self.clock.clone(),
        };
        Autotrack::new(config, self.session.clone(), ports)
    }
}
