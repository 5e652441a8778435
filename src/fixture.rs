//! Page fixtures for the replay tool: a document, the handshake state of the
//! page and a list of interactions to dispatch.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use autotrack_capture::{EventKind, RawEvent};
use autotrack_core_types::{Clock, FixedClock, InstrumentationSession, SystemClock};
use autotrack_dom::{DocumentPort, MemoryDocument, NodeSpec, PageInfo};
use autotrack_editor::{MemoryLocation, MemorySessionStorage, RecordingEditorHost};
use autotrack_event_sink::{InMemorySink, TrackedEvent};
use autotrack_gate::MemoryCookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::autotrack::{Autotrack, AutotrackPorts, InitOutcome};
use crate::config::AutotrackConfig;
use crate::decide::{DecideReply, StaticDecideClient};
use crate::errors::{AutotrackError, AutotrackResult};
use crate::listeners::RecordingListenerRegistry;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageFixture {
    /// Overrides the configured project token.
    pub token: Option<String>,
    pub page: PageInfo,
    pub document: NodeSpec,
    pub hash: String,
    pub search: String,
    pub session_storage: BTreeMap<String, String>,
    pub decide: FixtureDecide,
    pub events: Vec<FixtureEvent>,
    pub now_ms: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FixtureDecide {
    pub headers: BTreeMap<String, String>,
    pub body: Value,
    /// Simulates a transport failure.
    pub error: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FixtureEvent {
    pub kind: EventKind,
    pub selector: String,
    /// Which match of `selector` is the target.
    #[serde(default)]
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    #[serde(skip)]
    pub outcome: InitOutcome,
    pub events: Vec<TrackedEvent>,
    pub editor_scripts: Vec<String>,
}

impl PageFixture {
    pub fn load(path: &Path) -> AutotrackResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| AutotrackError::Fixture(format!("{}: {}", path.display(), err)))?;
        serde_json::from_str(&raw).map_err(|err| AutotrackError::Fixture(err.to_string()))
    }
}

/// Initializes autotrack against the fixture page and dispatches its events.
pub async fn replay(config: &AutotrackConfig, fixture: &PageFixture) -> AutotrackResult<ReplayReport> {
    let mut config = config.clone();
    if let Some(token) = &fixture.token {
        config.token = token.clone();
    }

    let clock: Arc<dyn Clock> = match fixture.now_ms {
        Some(now) => Arc::new(FixedClock::new(now)),
        None => Arc::new(SystemClock),
    };
    let document = Arc::new(MemoryDocument::from_spec(fixture.page.clone(), &fixture.document));
    let sink = InMemorySink::new(64);
    let storage = fixture
        .session_storage
        .iter()
        .fold(MemorySessionStorage::new(), |storage, (key, value)| {
            storage.with_entry(key, value)
        });
    let editor_host = Arc::new(RecordingEditorHost::new());
    let decide = match &fixture.decide.error {
        Some(message) => StaticDecideClient::failing(message.clone()),
        None => StaticDecideClient::new(DecideReply {
            headers: fixture
                .decide
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<HashMap<_, _>>(),
            body: fixture.decide.body.clone(),
        }),
    };

    let ports = AutotrackPorts {
        document: document.clone(),
        sink: sink.clone(),
        cookies: Arc::new(MemoryCookieJar::new(clock.clone())),
        location: Arc::new(
            MemoryLocation::new(fixture.page.pathname.clone(), fixture.hash.clone())
                .with_search(fixture.search.clone()),
        ),
        storage: Arc::new(storage),
        editor_host: editor_host.clone(),
        decide: Arc::new(decide),
        listeners: Arc::new(RecordingListenerRegistry::new()),
        clock,
    };
    let autotrack = Autotrack::new(config, InstrumentationSession::new(), ports);
    let outcome = autotrack.initialize().await;
    debug!(target: "autotrack.init", ?outcome, "fixture initialized");

    for event in &fixture.events {
        let matches = document.query_selector_all(&event.selector)?;
        let target = matches.get(event.index).copied().ok_or_else(|| {
            AutotrackError::Fixture(format!(
                "selector '{}' has no match at index {}",
                event.selector, event.index
            ))
        })?;
        autotrack.handle_event(&RawEvent::new(event.kind.clone(), target));
    }

    Ok(ReplayReport {
        outcome,
        events: sink.take(),
        editor_scripts: editor_host.scripts(),
    })
}
