//! Two independent gates consulted around event capture: a server-driven
//! kill switch persisted as a cookie, and a token-hash rollout check.

pub mod backoff;
pub mod errors;
pub mod rollout;

pub use backoff::{
    parse_backoff_seconds, BackoffGate, CookieJar, MemoryCookieJar, ResponseHeaders,
    BACKOFF_HEADER, DISABLE_COOKIE,
};
pub use errors::{GateError, GateResult};
pub use rollout::{is_enabled, RolloutGate, DEFAULT_BUCKETS};
