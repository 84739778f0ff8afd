use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Picks the upstream nameserver used for PTR lookups of a client IP.
/// Rules are evaluated in ascending `priority` order; first subnet match
/// wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientResolverRule {
    pub id: Option<i64>,
    pub subnet: String,
    pub nameserver: String,
    pub priority: i64,
    pub enabled: bool,
}

impl ClientResolverRule {
    pub fn validate(&self) -> Result<(), String> {
        self.subnet
            .parse::<IpNetwork>()
            .map_err(|e| format!("Invalid subnet '{}': {}", self.subnet, e))?;
        if self.nameserver.trim().is_empty() {
            return Err("Nameserver cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Pre-parsed rule set for repeated matching within one ingest batch.
pub struct RuleMatcher {
    rules: Vec<(IpNetwork, String)>,
}

impl RuleMatcher {
    /// Builds from rules already sorted by priority; rows with unparseable
    /// subnets are skipped rather than failing the whole set.
    pub fn new(rules: &[ClientResolverRule]) -> Self {
        let rules = rules
            .iter()
            .filter(|r| r.enabled)
            .filter_map(|r| {
                r.subnet
                    .parse::<IpNetwork>()
                    .ok()
                    .map(|net| (net, r.nameserver.clone()))
            })
            .collect();
        Self { rules }
    }

    pub fn nameserver_for(&self, ip: IpAddr) -> Option<&str> {
        self.rules
            .iter()
            .find(|(net, _)| net.contains(ip))
            .map(|(_, ns)| ns.as_str())
    }
}
