use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_domain::{Client, ClientGroup, DomainError};

/// Repository for observed clients and their groups. Client rows are
/// created by the ingest batch itself (same transaction as the events);
/// this port covers the naming and grouping side.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn get_by_ip(&self, ip: &str) -> Result<Option<Client>, DomainError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Client>, DomainError>;

    /// Persist a PTR lookup outcome (hit or error) on the client row.
    async fn set_rdns_result(
        &self,
        ip: &str,
        rdns_name: Option<&str>,
        rdns_error: Option<&str>,
        resolved_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    async fn save_group(&self, group: ClientGroup) -> Result<ClientGroup, DomainError>;

    /// Attach ungrouped clients whose IP falls inside `cidr` to the group.
    /// Returns the number of clients assigned.
    async fn assign_ungrouped_in_cidr(
        &self,
        group_id: i64,
        cidr: &str,
    ) -> Result<u64, DomainError>;
}
