//! Ansible inventory built from running sessions.
//!
//! Two views over the same session list:
//!
//! - [`build_inventory`] for `--list`: the `benchmark_nodes` group plus
//!   `_meta.hostvars` for every addressable session.
//! - [`host_vars`] for `--host <name>`: one host's variables.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::config::InventoryConfig;
use crate::source::{Session, DEFAULT_SSH_PORT};

/// Name of the inventory group holding every session host.
pub const GROUP_NAME: &str = "benchmark_nodes";

/// SSH arguments applied to every host. Session hosts are ephemeral, so
/// host keys are never pinned.
pub const SSH_COMMON_ARGS: &str = "-o StrictHostKeyChecking=no -o UserKnownHostsFile=/dev/null";

/// Inventory key for a session host.
///
/// `"{host}_{port}"` for non-default ports, plain `"{host}"` for port 22.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    /// Derive the key for a host and port.
    #[must_use]
    pub fn new(host: &str, port: u16) -> Self {
        if port == DEFAULT_SSH_PORT {
            Self(host.to_string())
        } else {
            Self(format!("{host}_{port}"))
        }
    }

    /// Key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for HostId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Per-host variables.
///
/// Everything except the SSH endpoint is copied from the session as the API
/// sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostVars {
    pub ansible_host: String,
    pub ansible_port: u16,
    pub session_id: Value,
    pub provider: Value,
    pub gpu_type: Value,
    pub gpu_count: Value,
    pub price_per_hour: Value,
    pub offer_id: Value,
    pub consumer_id: Value,
}

impl HostVars {
    fn from_session(host: &str, port: u16, session: &Session) -> Self {
        Self {
            ansible_host: host.to_string(),
            ansible_port: port,
            session_id: session.session_id(),
            provider: session.provider(),
            gpu_type: session.gpu_type(),
            gpu_count: session.gpu_count(),
            price_per_hour: session.price_per_hour(),
            offer_id: session.offer_id(),
            consumer_id: session.consumer_id(),
        }
    }
}

/// Variables applied to every host in the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupVars {
    pub ansible_user: String,
    pub ansible_ssh_private_key_file: String,
    pub ansible_ssh_common_args: String,
}

/// The session host group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostGroup {
    /// Host keys in session order. Not deduplicated.
    pub hosts: Vec<HostId>,
    pub vars: GroupVars,
}

/// The `_meta` section of a list-mode inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryMeta {
    pub hostvars: BTreeMap<HostId, HostVars>,
}

/// Full inventory document for `--list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inventory {
    #[serde(rename = "benchmark_nodes")]
    pub group: HostGroup,
    #[serde(rename = "_meta")]
    pub meta: InventoryMeta,
}

/// What the inventory executable was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Full inventory (`--list`, or no flag).
    List,
    /// Variables for one host (`--host <name>`).
    Host(String),
}

/// Addressable sessions with their host and effective port.
fn addressable(sessions: &[Session]) -> impl Iterator<Item = (&str, u16, &Session)> {
    sessions
        .iter()
        .filter_map(|session| session.ssh_host().map(|host| (host, session.ssh_port(), session)))
}

/// Build the full inventory.
///
/// Sessions without an SSH host are skipped. A repeated host key is listed
/// again in `hosts`, and its hostvars entry holds the last session seen.
#[must_use]
pub fn build_inventory(sessions: &[Session], ssh_key_path: &str, ssh_user: &str) -> Inventory {
    let mut inventory = Inventory {
        group: HostGroup {
            hosts: Vec::new(),
            vars: GroupVars {
                ansible_user: ssh_user.to_string(),
                ansible_ssh_private_key_file: ssh_key_path.to_string(),
                ansible_ssh_common_args: SSH_COMMON_ARGS.to_string(),
            },
        },
        meta: InventoryMeta::default(),
    };

    for (host, port, session) in addressable(sessions) {
        let host_id = HostId::new(host, port);
        inventory.group.hosts.push(host_id.clone());
        inventory
            .meta
            .hostvars
            .insert(host_id, HostVars::from_session(host, port, session));
    }

    inventory
}

/// Variables for `hostname`, matched by host key or raw host.
///
/// Returns the first matching session in input order.
#[must_use]
pub fn host_vars(hostname: &str, sessions: &[Session]) -> Option<HostVars> {
    addressable(sessions)
        .find(|(host, port, _)| HostId::new(host, *port) == *hostname || *host == hostname)
        .map(|(host, port, session)| HostVars::from_session(host, port, session))
}

/// Render the stdout payload for a request, pretty-printed with 2-space
/// indentation. An unknown host renders as `{}`.
///
/// # Errors
/// Returns error if the document cannot be serialized.
pub fn render(
    request: &Request,
    sessions: &[Session],
    config: &InventoryConfig,
) -> serde_json::Result<String> {
    match request {
        Request::List => serde_json::to_string_pretty(&build_inventory(
            sessions,
            &config.ssh_key_path,
            &config.ssh_user,
        )),
        Request::Host(hostname) => match host_vars(hostname, sessions) {
            Some(vars) => serde_json::to_string_pretty(&vars),
            None => serde_json::to_string_pretty(&serde_json::Map::new()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(value: Value) -> Session {
        serde_json::from_value(value).unwrap()
    }

    fn scenario_a() -> Vec<Session> {
        vec![session(json!({
            "ssh_host": "10.0.0.5",
            "ssh_port": 22,
            "id": "s1",
            "gpu_type": "A100",
            "gpu_count": 2
        }))]
    }

    fn scenario_a_vars() -> Value {
        json!({
            "ansible_host": "10.0.0.5",
            "ansible_port": 22,
            "session_id": "s1",
            "provider": "",
            "gpu_type": "A100",
            "gpu_count": 2,
            "price_per_hour": 0,
            "offer_id": "",
            "consumer_id": ""
        })
    }

    #[test]
    fn test_host_id_default_port() {
        assert_eq!(HostId::new("10.0.0.5", 22).as_str(), "10.0.0.5");
    }

    #[test]
    fn test_host_id_custom_port() {
        assert_eq!(HostId::new("10.0.0.5", 2222).to_string(), "10.0.0.5_2222");
    }

    #[test]
    fn test_build_inventory_scenario_a() {
        let inventory = build_inventory(&scenario_a(), "/keys/id_rsa", "root");
        let value = serde_json::to_value(&inventory).unwrap();

        assert_eq!(
            value,
            json!({
                "benchmark_nodes": {
                    "hosts": ["10.0.0.5"],
                    "vars": {
                        "ansible_user": "root",
                        "ansible_ssh_private_key_file": "/keys/id_rsa",
                        "ansible_ssh_common_args": SSH_COMMON_ARGS
                    }
                },
                "_meta": {
                    "hostvars": { "10.0.0.5": scenario_a_vars() }
                }
            })
        );
    }

    #[test]
    fn test_build_inventory_custom_port_key() {
        let sessions = vec![session(json!({ "ssh_host": "10.0.0.5", "ssh_port": 2222 }))];
        let inventory = build_inventory(&sessions, "/keys/id_rsa", "root");

        assert_eq!(inventory.group.hosts, vec![HostId::new("10.0.0.5", 2222)]);
        let vars = &inventory.meta.hostvars[&HostId::new("10.0.0.5", 2222)];
        assert_eq!(vars.ansible_host, "10.0.0.5");
        assert_eq!(vars.ansible_port, 2222);
    }

    #[test]
    fn test_build_inventory_skips_unaddressable_sessions() {
        let sessions = vec![
            session(json!({ "id": "no-host" })),
            session(json!({ "id": "empty-host", "ssh_host": "" })),
            session(json!({ "id": "ok", "ssh_host": "10.0.0.9" })),
        ];
        let inventory = build_inventory(&sessions, "k", "u");

        assert_eq!(inventory.group.hosts.len(), 1);
        assert_eq!(inventory.meta.hostvars.len(), 1);
        assert_eq!(
            inventory.meta.hostvars[&HostId::new("10.0.0.9", 22)].session_id,
            "ok"
        );
    }

    #[test]
    fn test_build_inventory_empty_sessions_keeps_group_vars() {
        let inventory = build_inventory(&[], "/home/bench/.ssh/id_rsa", "ubuntu");

        assert!(inventory.group.hosts.is_empty());
        assert!(inventory.meta.hostvars.is_empty());
        assert_eq!(inventory.group.vars.ansible_user, "ubuntu");
        assert_eq!(
            inventory.group.vars.ansible_ssh_private_key_file,
            "/home/bench/.ssh/id_rsa"
        );
        assert_eq!(inventory.group.vars.ansible_ssh_common_args, SSH_COMMON_ARGS);
    }

    #[test]
    fn test_build_inventory_same_host_different_ports() {
        let sessions = vec![
            session(json!({ "ssh_host": "10.0.0.5", "ssh_port": 40001 })),
            session(json!({ "ssh_host": "10.0.0.5", "ssh_port": 40002 })),
            session(json!({ "ssh_host": "10.0.0.5" })),
        ];
        let inventory = build_inventory(&sessions, "k", "u");

        let hosts: Vec<_> = inventory.group.hosts.iter().map(HostId::as_str).collect();
        assert_eq!(hosts, vec!["10.0.0.5_40001", "10.0.0.5_40002", "10.0.0.5"]);
        assert_eq!(inventory.meta.hostvars.len(), 3);
    }

    #[test]
    fn test_build_inventory_duplicate_host_last_write_wins() {
        let sessions = vec![
            session(json!({ "id": "first", "ssh_host": "10.0.0.5", "ssh_port": 2222 })),
            session(json!({ "id": "second", "ssh_host": "10.0.0.5", "ssh_port": 2222 })),
        ];
        let inventory = build_inventory(&sessions, "k", "u");

        assert_eq!(inventory.group.hosts.len(), 2);
        assert_eq!(inventory.meta.hostvars.len(), 1);
        assert_eq!(
            inventory.meta.hostvars[&HostId::new("10.0.0.5", 2222)].session_id,
            "second"
        );
    }

    #[test]
    fn test_host_vars_passthrough_fields() {
        let sessions = vec![session(json!({
            "id": "sess-7",
            "provider": "vastai",
            "gpu_type": "RTX4090",
            "gpu_count": 4,
            "price_per_hour": 1.25,
            "offer_id": "offer-3",
            "consumer_id": "bench",
            "ssh_host": "203.0.113.10",
            "ssh_port": 41022
        }))];

        let vars = host_vars("203.0.113.10_41022", &sessions).unwrap();
        assert_eq!(
            serde_json::to_value(&vars).unwrap(),
            json!({
                "ansible_host": "203.0.113.10",
                "ansible_port": 41022,
                "session_id": "sess-7",
                "provider": "vastai",
                "gpu_type": "RTX4090",
                "gpu_count": 4,
                "price_per_hour": 1.25,
                "offer_id": "offer-3",
                "consumer_id": "bench"
            })
        );
    }

    #[test]
    fn test_host_vars_matches_raw_host() {
        let sessions = vec![session(json!({ "id": "s2", "ssh_host": "10.0.0.5", "ssh_port": 2222 }))];

        let vars = host_vars("10.0.0.5", &sessions).unwrap();
        assert_eq!(vars.session_id, "s2");
        assert_eq!(vars.ansible_port, 2222);
    }

    #[test]
    fn test_host_vars_first_match_wins() {
        let sessions = vec![
            session(json!({ "id": "skipped" })),
            session(json!({ "id": "first", "ssh_host": "10.0.0.5", "ssh_port": 2222 })),
            session(json!({ "id": "second", "ssh_host": "10.0.0.5" })),
        ];

        assert_eq!(host_vars("10.0.0.5", &sessions).unwrap().session_id, "first");
    }

    #[test]
    fn test_mistyped_passthrough_fields_keep_host() {
        let sessions = vec![session(json!({
            "ssh_host": "10.0.0.5",
            "id": 42,
            "gpu_count": 2.0
        }))];
        let inventory = build_inventory(&sessions, "k", "u");

        assert_eq!(inventory.group.hosts, vec![HostId::new("10.0.0.5", 22)]);
        let vars = serde_json::to_value(&inventory.meta.hostvars[&HostId::new("10.0.0.5", 22)]).unwrap();
        assert_eq!(vars["session_id"], json!(42));
        assert_eq!(vars["gpu_count"], json!(2.0));
        assert_eq!(vars["provider"], json!(""));
    }

    #[test]
    fn test_host_vars_no_match() {
        assert_eq!(host_vars("nomatch", &scenario_a()), None);
        assert_eq!(host_vars("nomatch", &[]), None);
    }

    #[test]
    fn test_render_host_scenario_c() {
        let config = InventoryConfig::from_lookup(|_| None);

        let found = render(&Request::Host("10.0.0.5".to_string()), &scenario_a(), &config).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&found).unwrap(), scenario_a_vars());

        let missing = render(&Request::Host("nomatch".to_string()), &scenario_a(), &config).unwrap();
        assert_eq!(missing, "{}");
    }

    #[test]
    fn test_render_list_is_pretty_printed() {
        let config = InventoryConfig {
            api_url: "http://localhost:8080".to_string(),
            ssh_key_path: "/keys/id_rsa".to_string(),
            ssh_user: "root".to_string(),
        };

        let output = render(&Request::List, &[], &config).unwrap();
        assert!(output.starts_with("{\n  \"benchmark_nodes\": {\n    \"hosts\": [],"));
        assert!(output.ends_with("\"_meta\": {\n    \"hostvars\": {}\n  }\n}"));
    }
}
