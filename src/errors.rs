//! Error taxonomy for the orchestration layer.

use autotrack_capture::CaptureError;
use autotrack_core_types::TrackError;
use autotrack_dom::DomError;
use autotrack_editor::EditorError;
use autotrack_event_sink::SinkError;
use autotrack_gate::GateError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AutotrackError {
    #[error("document never became ready after {attempts} attempts")]
    NotReady { attempts: u32 },
    #[error("capability query failed: {0}")]
    Decide(String),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid fixture: {0}")]
    Fixture(String),
}

pub type AutotrackResult<T> = Result<T, AutotrackError>;

impl AutotrackError {
    pub fn decide(msg: impl Into<String>) -> Self {
        Self::Decide(msg.into())
    }
}

impl From<AutotrackError> for TrackError {
    fn from(value: AutotrackError) -> Self {
        TrackError::new(value.to_string())
    }
}
