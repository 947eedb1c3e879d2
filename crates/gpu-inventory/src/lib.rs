//! Dynamic Ansible inventory for GPU Shopper sessions.
//!
//! This crate queries the GPU Shopper API for running sessions and reshapes
//! them into the JSON documents Ansible expects from an inventory executable.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌───────────────────┐
//! │   Config     │    │  Session Source  │    │  Inventory        │
//! │  (env vars)  │───►│  GET /sessions   │───►│  --list / --host  │───► stdout (JSON)
//! └──────────────┘    └──────────────────┘    └───────────────────┘
//!                              │
//!                              ▼
//!                     warn on stderr, no hosts
//! ```
//!
//! An unreachable API never fails the inventory run: Ansible may call the
//! executable repeatedly, so fetch and decode failures degrade to an empty
//! session list with a warning.
//!
//! ## Example
//!
//! ```ignore
//! use gpu_inventory::{load_sessions, render, InventoryConfig, Request, ShopperClient};
//!
//! let config = InventoryConfig::from_env();
//! let client = ShopperClient::new(&config.api_url)?;
//!
//! let sessions = load_sessions(&client).await;
//! println!("{}", render(&Request::List, &sessions, &config)?);
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod inventory;
pub mod source;

pub use config::InventoryConfig;
pub use inventory::{
    build_inventory, host_vars, render, GroupVars, HostGroup, HostId, HostVars, Inventory,
    InventoryMeta, Request,
};
pub use source::shopper::ShopperClient;
pub use source::{load_sessions, FetchError, Session, SessionSource};
