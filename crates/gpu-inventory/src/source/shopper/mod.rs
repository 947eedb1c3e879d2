//! GPU Shopper session source.
//!
//! Implements the [`SessionSource`](crate::source::SessionSource) trait
//! against the GPU Shopper REST API.
//!
//! ## Endpoint
//!
//! - `GET /api/v1/sessions?status=running` - returns `{"sessions": [...]}`
//!
//! ## Example
//!
//! ```ignore
//! use gpu_inventory::source::shopper::ShopperClient;
//! use gpu_inventory::source::SessionSource;
//!
//! let client = ShopperClient::new("http://localhost:8080")?;
//! let sessions = client.running_sessions().await?;
//! ```

mod client;
mod models;

pub use client::{ShopperClient, DEFAULT_TIMEOUT_SECS, SESSIONS_PATH};
