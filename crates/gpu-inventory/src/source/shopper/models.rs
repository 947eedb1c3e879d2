//! GPU Shopper API models.

use serde::Deserialize;
use serde_json::Value;

/// Response body of the session listing endpoint.
///
/// Entries are kept as raw JSON so one malformed session does not
/// invalidate the rest of the list.
#[derive(Debug, Deserialize)]
pub struct SessionsResponse {
    /// Session entries. Absent or `null` means no sessions.
    pub sessions: Option<Vec<Value>>,
}
