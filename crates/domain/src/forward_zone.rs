use serde::{Deserialize, Serialize};

/// Routes a DNS subtree to fixed upstream servers. A `node_id` of `None`
/// means the zone applies to every node; a per-node row overrides the global
/// one when the domain collides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardZone {
    pub id: Option<i64>,
    pub node_id: Option<i64>,
    pub domain: String,
    pub servers: String,
    pub enabled: bool,
}

impl ForwardZone {
    pub fn new(domain: String, servers: String) -> Self {
        Self {
            id: None,
            node_id: None,
            domain,
            servers,
            enabled: true,
        }
    }

    /// Server list split on the `;`/`,` separators accepted from operators.
    pub fn server_list(&self) -> Vec<&str> {
        self.servers
            .split([';', ','])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.domain.trim().is_empty() {
            return Err("Forward zone domain cannot be empty".to_string());
        }
        if self.server_list().is_empty() {
            return Err("Forward zone needs at least one server".to_string());
        }
        Ok(())
    }

    /// The `domain=server[;server...]` line in the generated config file.
    pub fn config_line(&self) -> String {
        format!("{}={}", self.domain, self.servers)
    }
}
