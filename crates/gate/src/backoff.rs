//! Server-requested pause of event capture.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use autotrack_core_types::Clock;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::errors::GateResult;

pub const BACKOFF_HEADER: &str = "X-MP-CE-Backoff";
pub const DISABLE_COOKIE: &str = "__mpced";

/// Host cookie storage. Values set with a `max_age` must stop being returned
/// once it elapses.
pub trait CookieJar: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    fn set(&self, name: &str, value: &str, max_age_secs: u64, cross_subdomain: bool)
        -> GateResult<()>;
}

/// Header lookup on a transport response; names compare case-insensitively.
pub trait ResponseHeaders {
    fn header(&self, name: &str) -> Option<&str>;
}

impl ResponseHeaders for HashMap<String, String> {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl ResponseHeaders for BTreeMap<String, String> {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Leading integer of a header value, the way lenient clients read it
/// (`"30s"` is 30, `"abc"` is nothing). Oversized values saturate.
pub fn parse_backoff_seconds(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // An all-digit run only fails to parse on overflow.
    let value: i64 = digits[..end].parse().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

pub struct BackoffGate {
    jar: Arc<dyn CookieJar>,
    clock: Arc<dyn Clock>,
}

impl BackoffGate {
    pub fn new(jar: Arc<dyn CookieJar>, clock: Arc<dyn Clock>) -> Self {
        Self { jar, clock }
    }

    /// True while a previous backoff is in force.
    pub fn should_skip(&self) -> bool {
        self.jar.get(DISABLE_COOKIE).as_deref() == Some("true")
    }

    /// Persists the kill switch when the response asks for a positive number
    /// of seconds. Returns the applied duration.
    pub fn apply_backoff_from_response(
        &self,
        response: &dyn ResponseHeaders,
    ) -> GateResult<Option<u64>> {
        let Some(raw) = response.header(BACKOFF_HEADER) else {
            return Ok(None);
        };
        let seconds = match parse_backoff_seconds(raw) {
            Some(seconds) if seconds > 0 => seconds as u64,
            _ => {
                debug!(target: "autotrack.gate", header = raw, "backoff header ignored");
                return Ok(None);
            }
        };

        let now = self.clock.now_ms();
        let until = now.saturating_add((seconds as i64).saturating_mul(1000));
        info!(
            target: "autotrack.gate",
            seconds,
            from_ms = now,
            until_ms = until,
            "disabling autotrack for {seconds} seconds"
        );
        self.jar.set(DISABLE_COOKIE, "true", seconds, true)?;
        Ok(Some(seconds))
    }
}

#[derive(Debug, Clone)]
struct StoredCookie {
    value: String,
    expires_at_ms: i64,
    cross_subdomain: bool,
}

/// Clock-driven in-process cookie store.
pub struct MemoryCookieJar {
    clock: Arc<dyn Clock>,
    cookies: RwLock<HashMap<String, StoredCookie>>,
}

impl MemoryCookieJar {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            cookies: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_cross_subdomain(&self, name: &str) -> Option<bool> {
        self.cookies.read().get(name).map(|cookie| cookie.cross_subdomain)
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        let now = self.clock.now_ms();
        self.cookies
            .read()
            .get(name)
            .filter(|cookie| cookie.expires_at_ms > now)
            .map(|cookie| cookie.value.clone())
    }

    fn set(
        &self,
        name: &str,
        value: &str,
        max_age_secs: u64,
        cross_subdomain: bool,
    ) -> GateResult<()> {
        let max_age_ms = i64::try_from(max_age_secs)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        let cookie = StoredCookie {
            value: value.to_string(),
            expires_at_ms: self.clock.now_ms().saturating_add(max_age_ms),
            cross_subdomain,
        };
        self.cookies.write().insert(name.to_string(), cookie);
        Ok(())
    }
}
