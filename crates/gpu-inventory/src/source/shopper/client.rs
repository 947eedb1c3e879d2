//! GPU Shopper API client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::models::SessionsResponse;
use crate::source::traits::{FetchError, Session, SessionSource};

/// Path (with status filter) of the running-session listing.
pub const SESSIONS_PATH: &str = "/api/v1/sessions?status=running";

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// GPU Shopper API client.
#[derive(Clone)]
pub struct ShopperClient {
    /// HTTP client.
    client: Client,
    /// API base URL, without trailing slash.
    base_url: String,
    /// Request timeout.
    timeout: Duration,
}

impl ShopperClient {
    /// Create a new client with the default 10 second timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new client with a custom request timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Request timeout applied to every call.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL of the running-session listing.
    #[must_use]
    pub fn sessions_url(&self) -> String {
        format!("{}{SESSIONS_PATH}", self.base_url)
    }

    /// Make a GET request expecting a JSON object body.
    async fn get_object(&self, url: &str) -> Result<Map<String, Value>, FetchError> {
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                debug!(error = %e, body = %text, "Failed to parse response");
                FetchError::Decode(e)
            })
        } else {
            Err(FetchError::Status {
                status: status.as_u16(),
                body: text,
            })
        }
    }

    /// Convert raw session entries, skipping the ones that cannot be read.
    fn to_sessions(entries: Vec<Value>) -> Vec<Session> {
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable session entry");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl SessionSource for ShopperClient {
    async fn running_sessions(&self) -> Result<Vec<Session>, FetchError> {
        let body = self.get_object(&self.sessions_url()).await?;
        let response: SessionsResponse = serde_json::from_value(Value::Object(body))?;

        let sessions = Self::to_sessions(response.sessions.unwrap_or_default());
        debug!(count = sessions.len(), "Fetched running sessions");
        Ok(sessions)
    }
}
