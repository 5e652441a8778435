use autotrack_dom::DomError;
use autotrack_event_sink::SinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("document query failed: {0}")]
    Dom(#[from] DomError),
    #[error("event hand-off failed: {0}")]
    Sink(#[from] SinkError),
}

pub type CaptureResult<T> = Result<T, CaptureError>;
