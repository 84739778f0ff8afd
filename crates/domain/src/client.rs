use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// PTR results are trusted for an hour; failures are retried after 5 minutes.
pub const RDNS_CACHE_TTL_SECONDS: i64 = 3600;
pub const RDNS_ERROR_TTL_SECONDS: i64 = 300;

/// A DNS client observed in the event stream. Rows are created lazily on the
/// first event carrying a new source IP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Option<i64>,
    pub ip: String,
    pub display_name: Option<String>,
    pub rdns_name: Option<String>,
    pub rdns_last_resolved_at: Option<DateTime<Utc>>,
    pub rdns_last_error: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
    pub group_id: Option<i64>,
}

impl Client {
    pub fn new(ip: String) -> Self {
        Self {
            id: None,
            ip,
            display_name: None,
            rdns_name: None,
            rdns_last_resolved_at: None,
            rdns_last_error: None,
            last_seen: None,
            group_id: None,
        }
    }

    /// Best available label: operator-assigned name wins over reverse DNS.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.rdns_name.as_deref())
            .unwrap_or(&self.ip)
    }

    /// Whether a PTR lookup should run for this client at `now`.
    pub fn rdns_needs_refresh(&self, now: DateTime<Utc>) -> bool {
        let Some(resolved_at) = self.rdns_last_resolved_at else {
            return true;
        };
        let age = (now - resolved_at).num_seconds();
        if self.rdns_name.is_some() {
            age >= RDNS_CACHE_TTL_SECONDS
        } else {
            age >= RDNS_ERROR_TTL_SECONDS
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientGroup {
    pub id: Option<i64>,
    pub name: String,
    pub cidr: Option<String>,
    pub color: Option<String>,
}

impl ClientGroup {
    pub fn validate_name(name: &str) -> Result<(), String> {
        if name.is_empty() {
            return Err("Group name cannot be empty".to_string());
        }
        if name.len() > 100 {
            return Err("Group name cannot exceed 100 characters".to_string());
        }
        Ok(())
    }
}
