//! Error boundary for the public entry points. Instrumentation must never
//! take the host page down, so failures and panics end here as log lines.

use std::fmt::Display;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tracing::error;

/// Runs `f`, logging an `Err` or a panic. `None` means the entry point failed.
pub fn guard<T, E, F>(entry: &'static str, f: F) -> Option<T>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            error!(target: "autotrack.boundary", entry, error = %err, "entry point failed");
            None
        }
        Err(payload) => {
            error!(
                target: "autotrack.boundary",
                entry,
                panic = panic_message(payload.as_ref()),
                "entry point panicked"
            );
            None
        }
    }
}

pub async fn guard_async<T, E, Fut>(entry: &'static str, fut: Fut) -> Option<T>
where
    E: Display,
    Fut: Future<Output = Result<T, E>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            error!(target: "autotrack.boundary", entry, error = %err, "entry point failed");
            None
        }
        Err(payload) => {
            error!(
                target: "autotrack.boundary",
                entry,
                panic = panic_message(payload.as_ref()),
                "entry point panicked"
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
