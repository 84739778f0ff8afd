use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlocklistFormat {
    Hosts,
    Domains,
    Adblock,
}

impl BlocklistFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlocklistFormat::Hosts => "hosts",
            BlocklistFormat::Domains => "domains",
            BlocklistFormat::Adblock => "adblock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hosts" => Some(BlocklistFormat::Hosts),
            "domains" => Some(BlocklistFormat::Domains),
            "adblock" => Some(BlocklistFormat::Adblock),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Block,
    Allow,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Block => "block",
            ListType::Allow => "allow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "block" => Some(ListType::Block),
            "allow" => Some(ListType::Allow),
            _ => None,
        }
    }
}

/// A subscribed upstream list. Fetch state (`etag`, `last_modified`,
/// `last_update_status`) drives the conditional-GET refresh cycle; schedule
/// fields gate `enabled` by time of day (see `schedule`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blocklist {
    pub id: Option<i64>,
    pub name: String,
    pub url: String,
    pub format: BlocklistFormat,
    pub list_type: ListType,
    pub enabled: bool,
    pub update_frequency_hours: i64,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_update_status: Option<String>,
    pub last_error: Option<String>,
    pub entry_count: i64,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub schedule_enabled: bool,
    pub schedule_start: Option<String>,
    pub schedule_end: Option<String>,
    pub schedule_days: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Blocklist {
    pub fn new(name: String, url: String, format: BlocklistFormat, list_type: ListType) -> Self {
        Self {
            id: None,
            name,
            url,
            format,
            list_type,
            enabled: true,
            update_frequency_hours: 24,
            last_updated: None,
            last_update_status: None,
            last_error: None,
            entry_count: 0,
            etag: None,
            last_modified: None,
            schedule_enabled: false,
            schedule_start: None,
            schedule_end: None,
            schedule_days: None,
            created_at: None,
        }
    }

    /// A list is due for refresh once its update frequency has elapsed.
    pub fn refresh_due(&self, now: DateTime<Utc>) -> bool {
        if self.update_frequency_hours <= 0 {
            return false;
        }
        match self.last_updated {
            None => true,
            Some(last) => (now - last).num_hours() >= self.update_frequency_hours,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocklistEntry {
    pub id: Option<i64>,
    pub blocklist_id: i64,
    pub domain: String,
}

/// Operator-pinned allow/block domain, independent of any subscribed list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualEntry {
    pub id: Option<i64>,
    pub domain: String,
    pub entry_type: ListType,
    pub created_at: Option<DateTime<Utc>>,
}

/// Result of an exact-domain search across list entries and manual entries.
#[derive(Debug, Clone, Serialize)]
pub struct DomainSearchHit {
    pub domain: String,
    pub source: String,
    pub blocklist_id: Option<i64>,
    pub list_type: ListType,
}
