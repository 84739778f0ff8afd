use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_domain::{Blocklist, DomainError, DomainSearchHit};
use std::collections::BTreeSet;

/// Repository for subscribed blocklists and their materialized entries.
#[async_trait]
pub trait BlocklistRepository: Send + Sync {
    async fn create(&self, blocklist: Blocklist) -> Result<Blocklist, DomainError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Blocklist>, DomainError>;

    async fn get_by_url(&self, url: &str) -> Result<Option<Blocklist>, DomainError>;

    async fn get_all(&self) -> Result<Vec<Blocklist>, DomainError>;

    async fn get_enabled(&self) -> Result<Vec<Blocklist>, DomainError>;

    /// Lists with `schedule_enabled` set, for the schedule engine tick.
    async fn get_scheduled(&self) -> Result<Vec<Blocklist>, DomainError>;

    /// Full-row update used by audit rollback and operator edits.
    async fn update(&self, blocklist: &Blocklist) -> Result<(), DomainError>;

    async fn set_enabled(&self, id: i64, enabled: bool) -> Result<(), DomainError>;

    async fn delete(&self, id: i64) -> Result<(), DomainError>;

    /// Record a successful fetch: entry count, validators, status.
    async fn record_fetch_success(
        &self,
        id: i64,
        entry_count: i64,
        etag: Option<&str>,
        last_modified: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// 304 Not Modified: the stored entries are still current.
    async fn record_fetch_not_modified(&self, id: i64, at: DateTime<Utc>)
        -> Result<(), DomainError>;

    /// A failed fetch keeps prior entries; only the status fields change.
    async fn record_fetch_failure(
        &self,
        id: i64,
        error: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Replace the stored entry set for one list, in one transaction.
    async fn replace_entries(
        &self,
        blocklist_id: i64,
        domains: &BTreeSet<String>,
    ) -> Result<(), DomainError>;

    async fn entries_for(&self, blocklist_id: i64) -> Result<Vec<String>, DomainError>;

    /// Exact, case-insensitive domain lookup across list entries.
    async fn search_entries(&self, domain: &str) -> Result<Vec<DomainSearchHit>, DomainError>;
}
