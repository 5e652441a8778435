//! Page-load orchestration: readiness, editor bootstrap, capability query
//! and the delegated event entry point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use autotrack_capture::{pageview_properties, EventKind, InteractionTracker, RawEvent, EVENT_NAME};
use autotrack_core_types::{Clock, InstrumentationSession};
use autotrack_dom::DocumentPort;
use autotrack_editor::{EditorBootstrap, EditorHost, EditorSettings, LocationPort, SessionStorage};
use autotrack_event_sink::{EventSink, TrackedEvent};
use autotrack_gate::{is_enabled, BackoffGate, CookieJar, ResponseHeaders};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::boundary::{guard, guard_async};
use crate::config::AutotrackConfig;
use crate::decide::{DecideClient, DecideRequest, DecideResponse};
use crate::errors::{AutotrackError, AutotrackResult};
use crate::listeners::{ListenerPhase, ListenerRegistry};
use crate::readiness::wait_until_ready;

/// Host collaborators injected into an [`Autotrack`] instance.
#[derive(Clone)]
pub struct AutotrackPorts {
    pub document: Arc<dyn DocumentPort>,
    pub sink: Arc<dyn EventSink>,
    pub cookies: Arc<dyn CookieJar>,
    pub location: Arc<dyn LocationPort>,
    pub storage: Arc<dyn SessionStorage>,
    pub editor_host: Arc<dyn EditorHost>,
    pub decide: Arc<dyn DecideClient>,
    pub listeners: Arc<dyn ListenerRegistry>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitOutcome {
    /// The document cannot evaluate selectors.
    Unsupported,
    NotReady { attempts: u32 },
    /// The visual editor took over; no tracking on this page load.
    EditorActivated,
    Enabled,
    Disabled,
    /// Initialization failed internally; the boundary logged the cause.
    Failed,
}

pub struct Autotrack {
    config: AutotrackConfig,
    session: Arc<InstrumentationSession>,
    ports: AutotrackPorts,
    tracker: InteractionTracker,
    backoff: BackoffGate,
    editor: EditorBootstrap,
    enabled: RwLock<Option<bool>>,
    listening: AtomicBool,
}

impl Autotrack {
    pub fn new(
        config: AutotrackConfig,
        session: Arc<InstrumentationSession>,
        ports: AutotrackPorts,
    ) -> Self {
        let tracker = InteractionTracker::new(session.clone());
        let backoff = BackoffGate::new(ports.cookies.clone(), ports.clock.clone());
        let editor = EditorBootstrap::new(
            EditorSettings {
                token: config.token.clone(),
                app_host: config.app_host.clone(),
                debug: config.debug,
            },
            session.clone(),
            ports.location.clone(),
            ports.storage.clone(),
            ports.editor_host.clone(),
            ports.clock.clone(),
        );
        Self {
            config,
            session,
            ports,
            tracker,
            backoff,
            editor,
            enabled: RwLock::new(None),
            listening: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &AutotrackConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<InstrumentationSession> {
        &self.session
    }

    /// Rollout check for the configured token, usable before `initialize`.
    pub fn enabled_for_project(&self) -> bool {
        is_enabled(
            &self.config.token,
            self.config.rollout.total_buckets,
            self.config.rollout.enabled_buckets,
        )
    }

    /// `None` until the capability query has been answered.
    pub fn autotrack_enabled(&self) -> Option<bool> {
        *self.enabled.read()
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    pub async fn initialize(&self) -> InitOutcome {
        guard_async("initialize", self.try_initialize())
            .await
            .unwrap_or(InitOutcome::Failed)
    }

    /// Editor bootstrap entry point. True when the editor took over the page.
    pub fn maybe_load_editor(&self) -> bool {
        guard("editor_bootstrap", || self.editor.maybe_load_editor())
            .is_some_and(|state| state.is_activated())
    }

    /// Delegated listener body. Returns whether an event was emitted.
    pub fn handle_event(&self, event: &RawEvent) -> bool {
        if !self.is_listening() {
            return false;
        }
        if self.backoff.should_skip() {
            debug!(target: "autotrack.gate", event = %event.kind, "backoff active, event dropped");
            return false;
        }
        guard("handle_event", || {
            self.tracker
                .track(self.ports.document.as_ref(), event, self.ports.sink.as_ref())
        })
        .unwrap_or(false)
    }

    /// Feeds a transport response to the kill switch.
    pub fn apply_backoff(&self, response: &dyn ResponseHeaders) -> Option<u64> {
        guard("apply_backoff", || self.backoff.apply_backoff_from_response(response)).flatten()
    }

    async fn try_initialize(&self) -> AutotrackResult<InitOutcome> {
        let doc = self.ports.document.as_ref();
        if !doc.supports_query() {
            info!(target: "autotrack.init", "document cannot evaluate selectors, autotrack unsupported");
            return Ok(InitOutcome::Unsupported);
        }

        match wait_until_ready(doc, &self.config.readiness).await {
            Ok(_) => {}
            Err(AutotrackError::NotReady { attempts }) => {
                warn!(target: "autotrack.init", attempts, "document never became ready");
                return Ok(InitOutcome::NotReady { attempts });
            }
            Err(err) => return Err(err),
        }

        if self.maybe_load_editor() {
            info!(target: "autotrack.init", "editor activated, tracking skipped");
            return Ok(InitOutcome::EditorActivated);
        }

        let url = self.config.decide_url();
        let request = DecideRequest::new(self.config.token.clone());
        let response = match self.ports.decide.decide(&url, &request).await {
            Ok(reply) => {
                self.apply_backoff(&reply.headers);
                DecideResponse::from_body(&reply.body)
            }
            Err(err) => Err(err),
        };
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(target: "autotrack.init", error = %err, "capability query failed, autotrack stays disabled");
                *self.enabled.write() = Some(false);
                return Ok(InitOutcome::Disabled);
            }
        };

        if !response.enable_collect_everything {
            info!(target: "autotrack.init", "autotrack disabled for project");
            *self.enabled.write() = Some(false);
            return Ok(InitOutcome::Disabled);
        }

        if !response.custom_properties.is_empty() {
            self.session
                .install_custom_properties(response.custom_properties);
        }
        self.ports.sink.track(TrackedEvent::new(
            EVENT_NAME,
            pageview_properties(&doc.page()),
        ))?;
        for kind in EventKind::delegated() {
            self.ports.listeners.add_listener(kind, ListenerPhase::Capture);
        }
        self.listening.store(true, Ordering::Release);
        *self.enabled.write() = Some(true);
        info!(target: "autotrack.init", "autotrack enabled");
        Ok(InitOutcome::Enabled)
    }
}
