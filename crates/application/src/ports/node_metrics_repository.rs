use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_domain::{DomainError, NodeMetrics};

#[async_trait]
pub trait NodeMetricsRepository: Send + Sync {
    async fn insert(&self, metrics: &NodeMetrics) -> Result<(), DomainError>;

    async fn latest_for_node(&self, node_id: i64) -> Result<Option<NodeMetrics>, DomainError>;

    /// The newest snapshot per node, paired with the node's name, for the
    /// exporter.
    async fn latest_per_node(&self) -> Result<Vec<(String, NodeMetrics)>, DomainError>;

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
