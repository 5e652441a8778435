use autotrack_core_types::TrackError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("invalid rollout buckets: {enabled} enabled of {total}")]
    InvalidBuckets { total: u32, enabled: u32 },
    #[error("cookie write failed: {0}")]
    CookieWrite(String),
}

pub type GateResult<T> = Result<T, GateError>;

impl From<GateError> for TrackError {
    fn from(value: GateError) -> Self {
        TrackError::new(value.to_string())
    }
}
