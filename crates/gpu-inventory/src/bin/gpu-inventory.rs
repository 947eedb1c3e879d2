//! GPU Inventory - dynamic Ansible inventory for GPU Shopper sessions.
//!
//! Usage:
//!
//! ```text
//! gpu-inventory --list              # List all hosts
//! gpu-inventory --host <hostname>   # Get host variables
//! ```

use std::io::{IsTerminal, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gpu_inventory::source::log_fetch_failure;
use gpu_inventory::{load_sessions, render, InventoryConfig, Request, ShopperClient};

/// GPU Inventory - Ansible dynamic inventory backed by the GPU Shopper API.
///
/// Configuration comes from `GPU_SHOPPER_URL`, `SSH_KEY_PATH` and `SSH_USER`.
#[derive(Parser)]
#[command(name = "gpu-inventory")]
#[command(about = "Dynamic Ansible inventory for running GPU Shopper sessions")]
struct Cli {
    /// List all hosts (the default when no mode is given).
    #[arg(long, default_value = "false")]
    list: bool,

    /// Get variables for a single host.
    #[arg(long, value_name = "HOSTNAME")]
    host: Option<String>,

    /// Enable verbose logging on stderr.
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

impl Cli {
    /// `--list` wins over `--host`; an empty hostname falls back to listing.
    fn request(&self) -> Request {
        match &self.host {
            Some(host) if !self.list && !host.is_empty() => Request::Host(host.clone()),
            _ => Request::List,
        }
    }
}

/// Log directive: `RUST_LOG` when set, else `debug` with `--verbose`, else `warn`.
fn log_directive(verbose: bool, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => directive,
        _ if verbose => "debug".to_string(),
        _ => "warn".to_string(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the inventory JSON.
    let directive = log_directive(cli.verbose, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let config = InventoryConfig::from_env();
    debug!(
        api_url = %config.api_url,
        ssh_user = %config.ssh_user,
        ssh_key_path = %config.ssh_key_path,
        "Resolved inventory configuration"
    );

    let sessions = match ShopperClient::new(&config.api_url) {
        Ok(client) => load_sessions(&client).await,
        Err(e) => {
            log_fetch_failure(&e);
            Vec::new()
        }
    };

    let request = cli.request();
    debug!(?request, sessions = sessions.len(), "Rendering inventory");

    let payload = render(&request, &sessions, &config).context("Failed to serialize inventory")?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{payload}").context("Failed to write inventory")?;

    Ok(())
}
