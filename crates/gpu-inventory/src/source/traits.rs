//! Session source trait and common types.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// SSH port assumed when a session does not report one.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// GPU count assumed when a session does not report one.
pub const DEFAULT_GPU_COUNT: u32 = 1;

/// Errors that can occur while fetching sessions.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// API answered with a non-success status.
    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON document.
    #[error("Invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Whether the API could not be reached or refused the request.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Client(_) | Self::Transport(_) | Self::Status { .. }
        )
    }

    /// Whether the API answered but the body could not be decoded.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// A running GPU Shopper session, as reported by the API.
///
/// Only the SSH endpoint is typed, since it forms the inventory key. The
/// remaining fields are copied into host variables exactly as the API sent
/// them; accessors substitute defaults for absent or `null` values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Session {
    /// SSH host/IP address.
    pub ssh_host: Option<String>,
    /// SSH port.
    pub ssh_port: Option<u16>,
    /// Session ID.
    pub id: Option<Value>,
    /// Consumer that owns the session.
    pub consumer_id: Option<Value>,
    /// Provider name (e.g., "vastai", "tensordock").
    pub provider: Option<Value>,
    /// Offer the session was provisioned from.
    pub offer_id: Option<Value>,
    /// GPU model (e.g., "A100", "RTX4090").
    pub gpu_type: Option<Value>,
    /// Number of GPUs.
    pub gpu_count: Option<Value>,
    /// Hourly price in USD.
    pub price_per_hour: Option<Value>,
}

fn passthrough(field: Option<&Value>, default: impl FnOnce() -> Value) -> Value {
    field.cloned().unwrap_or_else(default)
}

fn or_empty(field: Option<&Value>) -> Value {
    passthrough(field, || Value::String(String::new()))
}

impl Session {
    /// SSH host, if the session is addressable.
    ///
    /// An empty host counts as missing.
    #[must_use]
    pub fn ssh_host(&self) -> Option<&str> {
        self.ssh_host.as_deref().filter(|host| !host.is_empty())
    }

    /// SSH port, defaulting to 22.
    #[must_use]
    pub fn ssh_port(&self) -> u16 {
        self.ssh_port.unwrap_or(DEFAULT_SSH_PORT)
    }

    /// Session ID, defaulting to `""`.
    #[must_use]
    pub fn session_id(&self) -> Value {
        or_empty(self.id.as_ref())
    }

    /// Consumer ID, defaulting to `""`.
    #[must_use]
    pub fn consumer_id(&self) -> Value {
        or_empty(self.consumer_id.as_ref())
    }

    /// Provider, defaulting to `""`.
    #[must_use]
    pub fn provider(&self) -> Value {
        or_empty(self.provider.as_ref())
    }

    /// Offer ID, defaulting to `""`.
    #[must_use]
    pub fn offer_id(&self) -> Value {
        or_empty(self.offer_id.as_ref())
    }

    /// GPU type, defaulting to `""`.
    #[must_use]
    pub fn gpu_type(&self) -> Value {
        or_empty(self.gpu_type.as_ref())
    }

    /// GPU count, defaulting to 1.
    #[must_use]
    pub fn gpu_count(&self) -> Value {
        passthrough(self.gpu_count.as_ref(), || Value::from(DEFAULT_GPU_COUNT))
    }

    /// Hourly price, defaulting to 0.
    #[must_use]
    pub fn price_per_hour(&self) -> Value {
        passthrough(self.price_per_hour.as_ref(), || Value::from(0))
    }
}

/// Trait for anything that can list running sessions.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// List sessions whose status is `running`.
    async fn running_sessions(&self) -> Result<Vec<Session>, FetchError>;
}
