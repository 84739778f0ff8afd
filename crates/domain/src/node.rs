use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Name reserved for the control-plane node itself. A row with this name is
/// created at boot and can never be deleted.
pub const PRIMARY_NODE_NAME: &str = "primary";

/// Minutes without a heartbeat before an active node is reported as stale.
pub const STALE_THRESHOLD_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Active,
    Error,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Pending => "pending",
            NodeStatus::Active => "active",
            NodeStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(NodeStatus::Pending),
            "active" => Some(NodeStatus::Active),
            "error" => Some(NodeStatus::Error),
            _ => None,
        }
    }
}

/// A resolver node known to the primary. The `api_key` is the bearer token
/// presented on every sync-protocol call; `config_version` is the
/// primary-side sync generation bumped by force-sync (the wire-level bundle
/// version is a content hash, see `policy::bundle_version`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: Option<i64>,
    pub name: String,
    pub api_key: String,
    pub ip_address: Option<String>,
    pub version: Option<String>,
    pub status: NodeStatus,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub config_version: i64,
    pub queries_total: i64,
    pub queries_blocked: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl Node {
    pub fn new(name: String, api_key: String) -> Self {
        Self {
            id: None,
            name,
            api_key,
            ip_address: None,
            version: None,
            status: NodeStatus::Pending,
            last_seen: None,
            last_error: None,
            config_version: 0,
            queries_total: 0,
            queries_blocked: 0,
            created_at: None,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.name == PRIMARY_NODE_NAME
    }

    pub fn can_delete(&self) -> Result<(), ()> {
        if self.is_primary() {
            Err(())
        } else {
            Ok(())
        }
    }

    /// Health classification for operator-facing status: error beats
    /// pending beats stale beats active.
    pub fn health(&self, now: DateTime<Utc>) -> NodeHealth {
        if self.status == NodeStatus::Error || self.last_error.is_some() {
            return NodeHealth::Error;
        }
        match self.last_seen {
            None => NodeHealth::Pending,
            Some(seen) if now - seen > Duration::minutes(STALE_THRESHOLD_MINUTES) => {
                NodeHealth::Stale
            }
            Some(_) => NodeHealth::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeHealth {
    Pending,
    Active,
    Stale,
    Error,
}
