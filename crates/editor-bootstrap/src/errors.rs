use autotrack_core_types::TrackError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("unable to parse data from hash: {0}")]
    MalformedState(String),
    #[error("unable to parse stored editor params: {0}")]
    MalformedParams(String),
    #[error("session storage unavailable: {0}")]
    Storage(String),
}

pub type EditorResult<T> = Result<T, EditorError>;

impl From<EditorError> for TrackError {
    fn from(value: EditorError) -> Self {
        TrackError::new(value.to_string())
    }
}
