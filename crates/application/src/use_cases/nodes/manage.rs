use crate::ports::NodeRepository;
use crate::services::AuditLog;
use crate::use_cases::audit::snapshots::node_snapshot;
use chrono::Utc;
use powerblockade_domain::{ConfigChange, DomainError, Node, NodeHealth};
use std::sync::Arc;
use tracing::{info, instrument};

/// Operator-side node lifecycle: force-sync, error clearing, deletion,
/// and the boot-time primary bootstrap.
pub struct ManageNodesUseCase {
    nodes: Arc<dyn NodeRepository>,
    audit: Arc<AuditLog>,
}

/// Not serialized directly: `node` carries the API key, so HTTP layers
/// must project the fields they expose.
#[derive(Debug, Clone)]
pub struct NodeOverview {
    pub node: Node,
    pub health: NodeHealth,
}

impl ManageNodesUseCase {
    pub fn new(nodes: Arc<dyn NodeRepository>, audit: Arc<AuditLog>) -> Self {
        Self { nodes, audit }
    }

    pub async fn list(&self) -> Result<Vec<NodeOverview>, DomainError> {
        let now = Utc::now();
        Ok(self
            .nodes
            .get_all()
            .await?
            .into_iter()
            .map(|node| NodeOverview {
                health: node.health(now),
                node,
            })
            .collect())
    }

    /// Bump the sync generation so the node's agent refetches its bundle.
    #[instrument(skip(self))]
    pub async fn force_sync(&self, node_id: i64) -> Result<(), DomainError> {
        let node = self.require(node_id).await?;
        self.nodes.bump_config_version(node_id).await?;
        self.nodes.clear_error(node_id).await?;
        info!(node = %node.name, "Force sync requested");
        Ok(())
    }

    pub async fn clear_error(&self, node_id: i64) -> Result<(), DomainError> {
        self.require(node_id).await?;
        self.nodes.clear_error(node_id).await
    }

    /// Delete a secondary. The primary row is protected.
    #[instrument(skip(self))]
    pub async fn delete(&self, node_id: i64, actor_user_id: Option<i64>) -> Result<(), DomainError> {
        let node = self.require(node_id).await?;
        node.can_delete()
            .map_err(|_| DomainError::PrimaryNodeProtected)?;

        self.nodes.delete(node_id).await?;
        self.audit
            .record(
                ConfigChange::new("node", Some(node_id), "delete")
                    .with_actor(actor_user_id)
                    .with_before(node_snapshot(&node)),
            )
            .await?;
        info!(node = %node.name, "Node deleted");
        Ok(())
    }

    /// Ensure the primary row exists at boot; refreshes liveness when it
    /// already does.
    pub async fn bootstrap_primary(
        &self,
        name: &str,
        api_key: &str,
    ) -> Result<Node, DomainError> {
        let node = self.nodes.ensure_node(name, api_key, Utc::now()).await?;
        info!(node = %node.name, "Primary node ready");
        Ok(node)
    }

    async fn require(&self, node_id: i64) -> Result<Node, DomainError> {
        self.nodes
            .get_by_id(node_id)
            .await?
            .ok_or_else(|| DomainError::NodeNotFound(node_id.to_string()))
    }
}
