use crate::ports::{NodeMetricsRepository, NodeRepository};
use chrono::Utc;
use powerblockade_domain::{DomainError, NodeMetrics};
use std::sync::Arc;

/// Accepts a resolver-counter snapshot pushed by a node and refreshes its
/// liveness in the same call.
pub struct RecordNodeMetricsUseCase {
    metrics: Arc<dyn NodeMetricsRepository>,
    nodes: Arc<dyn NodeRepository>,
}

impl RecordNodeMetricsUseCase {
    pub fn new(metrics: Arc<dyn NodeMetricsRepository>, nodes: Arc<dyn NodeRepository>) -> Self {
        Self { metrics, nodes }
    }

    pub async fn execute(&self, node_id: i64, mut metrics: NodeMetrics) -> Result<(), DomainError> {
        metrics.node_id = node_id;
        metrics.ts = Some(Utc::now());
        self.metrics.insert(&metrics).await?;
        self.nodes.touch_last_seen(node_id, Utc::now()).await?;
        Ok(())
    }
}
