use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_domain::{DomainError, NodeCommand};

#[async_trait]
pub trait NodeCommandRepository: Send + Sync {
    async fn queue(&self, command: NodeCommand) -> Result<NodeCommand, DomainError>;

    /// Unexecuted commands addressed to this node or to all nodes.
    async fn pending_for_node(&self, node_id: i64) -> Result<Vec<NodeCommand>, DomainError>;

    /// Stamp `executed_at` and store the node's result payload. Returns
    /// false when the command id is unknown.
    async fn mark_executed(
        &self,
        command_id: i64,
        result: serde_json::Value,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;
}
