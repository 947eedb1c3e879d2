//! Session sources.
//!
//! This module contains the [`SessionSource`] trait, the GPU Shopper API
//! implementation, and the fail-open loader used by the inventory binary.

pub mod shopper;
pub mod traits;

pub use traits::{FetchError, Session, SessionSource, DEFAULT_GPU_COUNT, DEFAULT_SSH_PORT};

use tracing::{debug, warn};

/// Load running sessions, degrading to an empty list on failure.
///
/// Fetch and decode errors are logged as warnings with their full cause
/// chain and never reach the caller.
pub async fn load_sessions<S>(source: &S) -> Vec<Session>
where
    S: SessionSource + ?Sized,
{
    match source.running_sessions().await {
        Ok(sessions) => {
            debug!(count = sessions.len(), "Loaded running sessions");
            sessions
        }
        Err(e) => {
            log_fetch_failure(&e);
            Vec::new()
        }
    }
}

/// Log a fetch failure, including every underlying cause.
pub fn log_fetch_failure(e: &FetchError) {
    let cause = error_chain(e);
    if e.is_decode() {
        warn!(error = %cause, "Invalid JSON response from GPU Shopper API");
    } else {
        warn!(error = %cause, "Could not connect to GPU Shopper API");
    }
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        // thiserror `{0}` formats already embed the direct source.
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
