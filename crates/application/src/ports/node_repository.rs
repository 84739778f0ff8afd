use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_domain::{DomainError, Node};

/// Repository for resolver nodes and their sync state.
#[async_trait]
pub trait NodeRepository: Send + Sync {
    async fn create(&self, node: Node) -> Result<Node, DomainError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Node>, DomainError>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Node>, DomainError>;

    /// All nodes. Node auth iterates this set and compares keys in constant
    /// time rather than filtering by key in SQL.
    async fn get_all(&self) -> Result<Vec<Node>, DomainError>;

    /// Bind a registration to the key's row: name/ip/version, status active,
    /// `last_seen` now, `last_error` cleared.
    async fn register(
        &self,
        id: i64,
        name: &str,
        ip_address: Option<&str>,
        version: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Liveness update plus any counters the node reported.
    async fn heartbeat(
        &self,
        id: i64,
        version: Option<&str>,
        queries_total: Option<i64>,
        queries_blocked: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    async fn touch_last_seen(&self, id: i64, now: DateTime<Utc>) -> Result<(), DomainError>;

    /// Operator force-sync: advance the sync generation so agents refetch.
    async fn bump_config_version(&self, id: i64) -> Result<(), DomainError>;

    async fn clear_error(&self, id: i64) -> Result<(), DomainError>;

    async fn delete(&self, id: i64) -> Result<(), DomainError>;

    /// Insert the primary row if missing, else refresh its liveness.
    /// Returns the row either way.
    async fn ensure_node(
        &self,
        name: &str,
        api_key: &str,
        now: DateTime<Utc>,
    ) -> Result<Node, DomainError>;
}
