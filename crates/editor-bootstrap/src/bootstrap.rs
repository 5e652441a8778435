//! Credential reconciliation state machine.
//!
//! Credentials come from, in priority order: the URL fragment (legacy entry
//! snippets), a pre-parsed fragment left in session storage by current
//! snippets, or the bundle persisted by an earlier page of the same session.

use std::fmt;
use std::sync::Arc;

use autotrack_core_types::{Clock, InstrumentationSession};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::errors::{EditorError, EditorResult};
use crate::hash::{decode_state, expires_in_secs, hash_param};
use crate::params::EditorParams;
use crate::ports::{EditorHost, LocationPort, SessionStorage};

pub const EDITOR_ACTION: &str = "mpeditor";
pub const TRANSIENT_HASH_KEY: &str = "_mpcehash";
pub const EDITOR_PARAMS_KEY: &str = "editorParams";
pub const EDITOR_ENTRY_POINT: &str = "mp_load_editor";

const DEBUG_SCRIPT_PATH: &str = "/site_media/compiled/reports/collect-everything/editor.js";
const RELEASE_SCRIPT_PATH: &str = "/site_media/bundle-webpack/reports/collect-everything/editor.min.js";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    Url,
    TransientStorage,
    PersistedStorage,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialSource::Url => "url",
            CredentialSource::TransientStorage => "transient_storage",
            CredentialSource::PersistedStorage => "persisted_storage",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BootstrapState {
    NoCredentials,
    Resolved(CredentialSource),
    Validated(CredentialSource),
    /// `injected` is false when the script was already injected earlier in
    /// this page load.
    Activated {
        source: CredentialSource,
        injected: bool,
    },
    Rejected(CredentialSource),
}

impl BootstrapState {
    pub fn is_activated(&self) -> bool {
        matches!(self, BootstrapState::Activated { .. })
    }
}

#[derive(Clone, Debug, Default)]
pub struct EditorSettings {
    pub token: String,
    pub app_host: String,
    pub debug: bool,
}

pub struct EditorBootstrap {
    settings: EditorSettings,
    session: Arc<InstrumentationSession>,
    location: Arc<dyn LocationPort>,
    storage: Arc<dyn SessionStorage>,
    host: Arc<dyn EditorHost>,
    clock: Arc<dyn Clock>,
}

impl EditorBootstrap {
    pub fn new(
        settings: EditorSettings,
        session: Arc<InstrumentationSession>,
        location: Arc<dyn LocationPort>,
        storage: Arc<dyn SessionStorage>,
        host: Arc<dyn EditorHost>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            session,
            location,
            storage,
            host,
            clock,
        }
    }

    /// Runs the state machine to a terminal state, injecting the editor when
    /// the credentials belong to the configured project.
    pub fn maybe_load_editor(&self) -> EditorResult<BootstrapState> {
        let Some((source, params)) = self.resolve()? else {
            debug!(target: "autotrack.editor", "no editor credentials");
            return Ok(BootstrapState::NoCredentials);
        };
        self.transition(BootstrapState::Resolved(source));

        if !params.matches_token(&self.settings.token) {
            return Ok(self.transition(BootstrapState::Rejected(source)));
        }
        self.transition(BootstrapState::Validated(source));

        let injected = self.load_editor(params);
        Ok(self.transition(BootstrapState::Activated { source, injected }))
    }

    /// Injects the editor script once per page load. Returns whether this call
    /// performed the injection.
    pub fn load_editor(&self, params: EditorParams) -> bool {
        if !self.session.mark_editor_injected() {
            debug!(target: "autotrack.editor", "editor already injected");
            return false;
        }
        let src = self.script_url();
        info!(target: "autotrack.editor", %src, "loading editor");
        let host = Arc::clone(&self.host);
        self.host.load_script(
            &src,
            Box::new(move || {
                debug!(target: "autotrack.editor", entry = EDITOR_ENTRY_POINT, "editor script loaded");
                host.launch_editor(&params);
            }),
        );
        true
    }

    pub fn script_url(&self) -> String {
        let path = if self.settings.debug {
            DEBUG_SCRIPT_PATH
        } else {
            RELEASE_SCRIPT_PATH
        };
        format!(
            "{}{}?_ts={}",
            self.settings.app_host.trim_end_matches('/'),
            path,
            self.clock.now_ms()
        )
    }

    fn resolve(&self) -> EditorResult<Option<(CredentialSource, EditorParams)>> {
        let hash = self.location.hash();
        let url_state = decode_state(&hash)
            .map_err(|err| self.parse_failure(err))?
            .filter(is_editor_state);
        if let Some(state) = url_state {
            let params = self.params_from_hash(&hash)?;
            self.normalize_location(&state);
            return Ok(Some((CredentialSource::Url, params)));
        }

        if let Some(blob) = self.storage.get(TRANSIENT_HASH_KEY).filter(|blob| !blob.is_empty()) {
            self.storage.remove(TRANSIENT_HASH_KEY);
            let params = self.params_from_hash(&blob)?;
            return Ok(Some((CredentialSource::TransientStorage, params)));
        }

        match self.storage.get(EDITOR_PARAMS_KEY) {
            None => Ok(None),
            Some(raw) => {
                let params = serde_json::from_str(&raw)
                    .map_err(|err| EditorError::MalformedParams(err.to_string()))?;
                Ok(Some((CredentialSource::PersistedStorage, params)))
            }
        }
    }

    /// Builds and persists editor params from a fragment-shaped string.
    fn params_from_hash(&self, hash: &str) -> EditorResult<EditorParams> {
        let state = match decode_state(hash) {
            Ok(Some(state)) => state,
            Ok(None) => {
                return Err(self.parse_failure(EditorError::MalformedState(
                    "missing state parameter".into(),
                )))
            }
            Err(err) => return Err(self.parse_failure(err)),
        };

        let expires_at = self
            .clock
            .now_ms()
            .saturating_add(expires_in_secs(hash).saturating_mul(1000));
        let params = EditorParams {
            access_token: hash_param(hash, "access_token").map(str::to_string),
            access_token_expires_at: Some(expires_at),
            app_host: Some(self.settings.app_host.clone()),
            bookmarklet_mode: state.get("bookmarkletMode").is_some_and(is_truthy),
            project_id: state.get("projectId").cloned(),
            project_token: state.get("token").and_then(Value::as_str).map(str::to_string),
            user_flags: state.get("userFlags").cloned(),
            user_id: state.get("userId").cloned(),
        };

        let serialized = serde_json::to_string(&params)
            .map_err(|err| EditorError::MalformedParams(err.to_string()))?;
        self.storage.set(EDITOR_PARAMS_KEY, &serialized)?;
        Ok(params)
    }

    /// Restores the declared fragment, else drops it from the URL.
    fn normalize_location(&self, state: &Map<String, Value>) {
        let desired = state
            .get("desiredHash")
            .and_then(Value::as_str)
            .filter(|desired| !desired.is_empty());
        if let Some(desired) = desired {
            self.location.set_hash(desired);
        } else if self.location.supports_history() {
            let url = format!("{}{}", self.location.pathname(), self.location.search());
            self.location.replace_state(&url);
        } else {
            self.location.set_hash("");
        }
    }

    fn parse_failure(&self, err: EditorError) -> EditorError {
        error!(target: "autotrack.editor", error = %err, "unable to parse data from hash");
        err
    }

    fn transition(&self, state: BootstrapState) -> BootstrapState {
        debug!(target: "autotrack.editor", state = ?state, "editor bootstrap state");
        state
    }
}

fn is_editor_state(state: &Map<String, Value>) -> bool {
    state.get("action").and_then(Value::as_str) == Some(EDITOR_ACTION)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MemoryLocation, MemorySessionStorage, RecordingEditorHost};
    use autotrack_core_types::FixedClock;
    use pretty_assertions::assert_eq;

    const NOW: i64 = 1_700_000_000_000;

    struct Harness {
        session: Arc<InstrumentationSession>,
        location: Arc<MemoryLocation>,
        storage: Arc<MemorySessionStorage>,
        host: Arc<RecordingEditorHost>,
    }

    impl Harness {
        fn new(location: MemoryLocation, storage: MemorySessionStorage) -> Self {
            Self {
                session: InstrumentationSession::new(),
                location: Arc::new(location),
                storage: Arc::new(storage),
                host: Arc::new(RecordingEditorHost::new()),
            }
        }

        fn bootstrap(&self, token: &str) -> EditorBootstrap {
            EditorBootstrap::new(
                EditorSettings {
                    token: token.into(),
                    app_host: "https://mixpanel.com".into(),
                    debug: false,
                },
                self.session.clone(),
                self.location.clone(),
                self.storage.clone(),
                self.host.clone(),
                Arc::new(FixedClock::new(NOW)),
            )
        }
    }

    fn editor_hash(token: &str, extra: &str) -> String {
        let state = format!(r#"{{"action":"mpeditor","token":"{token}","projectId":7,"userId":9{extra}}}"#);
        format!(
            "#access_token=secret&expires_in=60&state={}",
            urlencoding::encode(&state)
        )
    }

    #[test]
    fn url_credentials_activate_and_persist() {
        let harness = Harness::new(
            MemoryLocation::new("/pricing", editor_hash("abc", "")).with_search("?plan=pro"),
            MemorySessionStorage::new(),
        );
        let state = harness.bootstrap("abc").maybe_load_editor().unwrap();
        assert_eq!(
            state,
            BootstrapState::Activated {
                source: CredentialSource::Url,
                injected: true
            }
        );

        let stored: EditorParams =
            serde_json::from_str(&harness.storage.get(EDITOR_PARAMS_KEY).unwrap()).unwrap();
        assert_eq!(stored.project_token.as_deref(), Some("abc"));
        assert_eq!(stored.access_token.as_deref(), Some("secret"));
        assert_eq!(stored.access_token_expires_at, Some(NOW + 60_000));
        assert_eq!(stored.app_host.as_deref(), Some("https://mixpanel.com"));

        assert_eq!(harness.location.replaced_urls(), vec!["/pricing?plan=pro".to_string()]);
        assert_eq!(harness.location.hash(), "");

        let scripts = harness.host.scripts();
        assert_eq!(scripts.len(), 1);
        assert_eq!(
            scripts[0],
            format!("https://mixpanel.com{RELEASE_SCRIPT_PATH}?_ts={NOW}")
        );
        assert_eq!(harness.host.launches(), vec![stored]);
    }

    #[test]
    fn mismatched_token_is_rejected() {
        let harness = Harness::new(
            MemoryLocation::new("/", editor_hash("other", "")),
            MemorySessionStorage::new(),
        );
        let state = harness.bootstrap("abc").maybe_load_editor().unwrap();
        assert_eq!(state, BootstrapState::Rejected(CredentialSource::Url));
        assert!(harness.host.scripts().is_empty());
        assert!(!harness.session.editor_injected());
    }

    #[test]
    fn second_activation_does_not_reinject() {
        let harness = Harness::new(
            MemoryLocation::new("/", editor_hash("abc", "")),
            MemorySessionStorage::new(),
        );
        let bootstrap = harness.bootstrap("abc");
        assert!(bootstrap.maybe_load_editor().unwrap().is_activated());

        // Credentials now come from the persisted bundle.
        let again = bootstrap.maybe_load_editor().unwrap();
        assert_eq!(
            again,
            BootstrapState::Activated {
                source: CredentialSource::PersistedStorage,
                injected: false
            }
        );
        assert_eq!(harness.host.scripts().len(), 1);
    }

    #[test]
    fn transient_blob_is_consumed() {
        let blob = editor_hash("abc", r#","bookmarkletMode":1"#);
        let harness = Harness::new(
            MemoryLocation::new("/", ""),
            MemorySessionStorage::new().with_entry(TRANSIENT_HASH_KEY, &blob),
        );
        let state = harness.bootstrap("abc").maybe_load_editor().unwrap();
        assert_eq!(
            state,
            BootstrapState::Activated {
                source: CredentialSource::TransientStorage,
                injected: true
            }
        );
        assert_eq!(harness.storage.get(TRANSIENT_HASH_KEY), None);
        assert!(harness.host.launches()[0].bookmarklet_mode);
        assert!(harness.location.replaced_urls().is_empty());
    }

    #[test]
    fn desired_hash_is_restored() {
        let harness = Harness::new(
            MemoryLocation::new("/", editor_hash("abc", r##","desiredHash":"#section-2""##))
                .without_history(),
            MemorySessionStorage::new(),
        );
        harness.bootstrap("abc").maybe_load_editor().unwrap();
        assert_eq!(harness.location.hash(), "#section-2");
    }

    #[test]
    fn malformed_credentials_do_not_activate() {
        let harness = Harness::new(
            MemoryLocation::new("/", "#state=%7Bbroken"),
            MemorySessionStorage::new(),
        );
        assert!(harness.bootstrap("abc").maybe_load_editor().is_err());

        let harness = Harness::new(
            MemoryLocation::new("/", ""),
            MemorySessionStorage::new().with_entry(TRANSIENT_HASH_KEY, "#state=%7Bbroken"),
        );
        assert!(matches!(
            harness.bootstrap("abc").maybe_load_editor(),
            Err(EditorError::MalformedState(_))
        ));
        assert_eq!(harness.storage.get(TRANSIENT_HASH_KEY), None);
        assert!(harness.host.scripts().is_empty());
    }

    #[test]
    fn nothing_anywhere_means_no_credentials() {
        let harness = Harness::new(
            MemoryLocation::new("/", "#tab=2"),
            MemorySessionStorage::new(),
        );
        assert_eq!(
            harness.bootstrap("abc").maybe_load_editor().unwrap(),
            BootstrapState::NoCredentials
        );
    }

    #[test]
    fn debug_build_uses_unminified_script() {
        let harness = Harness::new(MemoryLocation::new("/", ""), MemorySessionStorage::new());
        let bootstrap = EditorBootstrap::new(
            EditorSettings {
                token: "abc".into(),
                app_host: "http://localhost:8000/".into(),
                debug: true,
            },
            harness.session.clone(),
            harness.location.clone(),
            harness.storage.clone(),
            harness.host.clone(),
            Arc::new(FixedClock::new(5)),
        );
        assert_eq!(
            bootstrap.script_url(),
            format!("http://localhost:8000{DEBUG_SCRIPT_PATH}?_ts=5")
        );
    }
}
