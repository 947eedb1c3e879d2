//! Inventory configuration.
//!
//! Resolved from environment variables, each with a default:
//!
//! - `GPU_SHOPPER_URL`: GPU Shopper API URL (default: `http://localhost:8080`)
//! - `SSH_KEY_PATH`: SSH private key path (default: `~/.ssh/id_rsa`, expanded)
//! - `SSH_USER`: SSH username (default: `root`)

use std::path::Path;

/// Environment variable for the GPU Shopper API URL.
pub const ENV_API_URL: &str = "GPU_SHOPPER_URL";

/// Environment variable for the SSH private key path.
pub const ENV_SSH_KEY_PATH: &str = "SSH_KEY_PATH";

/// Environment variable for the SSH username.
pub const ENV_SSH_USER: &str = "SSH_USER";

/// Default GPU Shopper API URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default SSH username.
pub const DEFAULT_SSH_USER: &str = "root";

/// Default SSH key location, relative to the home directory.
pub const DEFAULT_SSH_KEY_SUFFIX: &str = ".ssh/id_rsa";

/// Resolved inventory configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// GPU Shopper API base URL.
    pub api_url: String,
    /// Value for `ansible_ssh_private_key_file`.
    pub ssh_key_path: String,
    /// Value for `ansible_user`.
    pub ssh_user: String,
}

impl InventoryConfig {
    /// Resolve configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| {
            std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
        })
    }

    /// Resolve configuration from an arbitrary variable lookup.
    ///
    /// Only an absent variable falls back to its default; a variable set to
    /// an empty string is used as-is.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_url: lookup(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            ssh_key_path: lookup(ENV_SSH_KEY_PATH).unwrap_or_else(default_ssh_key_path),
            ssh_user: lookup(ENV_SSH_USER).unwrap_or_else(|| DEFAULT_SSH_USER.to_string()),
        }
    }
}

/// Default SSH key path under the invoking user's home directory.
///
/// Falls back to the unexpanded `~/.ssh/id_rsa` when the home directory
/// cannot be determined.
#[must_use]
pub fn default_ssh_key_path() -> String {
    dirs::home_dir().map_or_else(
        || format!("~/{DEFAULT_SSH_KEY_SUFFIX}"),
        |home| ssh_key_under(&home),
    )
}

fn ssh_key_under(home: &Path) -> String {
    home.join(DEFAULT_SSH_KEY_SUFFIX).display().to_string()
}
