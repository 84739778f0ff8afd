use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One resolved (or blocked) query reported by a node. `qname` is stored
/// normalized: lowercase, trailing dot stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsQueryEvent {
    pub id: Option<i64>,
    pub event_id: Option<String>,
    pub ts: DateTime<Utc>,
    pub node_id: Option<i64>,
    pub client_ip: String,
    pub client_id: Option<i64>,
    pub qname: String,
    pub qtype: u16,
    pub rcode: u8,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub blocklist_name: Option<String>,
    pub latency_ms: Option<i64>,
}

/// Lowercase and strip the trailing dot; the stored form used for all
/// qname comparisons.
pub fn normalize_qname(qname: &str) -> String {
    qname.trim().to_ascii_lowercase().trim_end_matches('.').to_string()
}
