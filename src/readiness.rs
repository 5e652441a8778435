use std::time::Duration;

use autotrack_dom::DocumentPort;
use tracing::{debug, info};

use crate::config::ReadinessConfig;
use crate::errors::{AutotrackError, AutotrackResult};

/// Polls until the document has a body. Returns the number of attempts used.
pub async fn wait_until_ready(
    doc: &dyn DocumentPort,
    config: &ReadinessConfig,
) -> AutotrackResult<u32> {
    let max_attempts = config.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        if doc.body().is_some() {
            debug!(target: "autotrack.init", attempt, "document ready");
            return Ok(attempt);
        }
        if attempt == max_attempts {
            break;
        }
        info!(
            target: "autotrack.init",
            attempt,
            "document not ready yet, trying again in {} milliseconds",
            config.retry_delay_ms
        );
        tokio::time::sleep(Duration::from_millis(config.retry_delay_ms)).await;
    }
    Err(AutotrackError::NotReady {
        attempts: max_attempts,
    })
}
