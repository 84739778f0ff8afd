use crate::ports::{NodeMetricsRepository, NodeRepository, RecursorClient};
use chrono::Utc;
use powerblockade_domain::{DomainError, NodeMetrics, NodeStatus, PRIMARY_NODE_NAME};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The local-metrics job: scrape the recursor beside the primary and store
/// the snapshot under the primary node.
pub struct ScrapeLocalMetricsUseCase {
    recursor: Arc<dyn RecursorClient>,
    metrics: Arc<dyn NodeMetricsRepository>,
    nodes: Arc<dyn NodeRepository>,
}

impl ScrapeLocalMetricsUseCase {
    pub fn new(
        recursor: Arc<dyn RecursorClient>,
        metrics: Arc<dyn NodeMetricsRepository>,
        nodes: Arc<dyn NodeRepository>,
    ) -> Self {
        Self {
            recursor,
            metrics,
            nodes,
        }
    }

    #[instrument(skip(self), name = "local_metrics_scrape")]
    pub async fn execute(&self) -> Result<bool, DomainError> {
        let Some(primary) = self.nodes.get_by_name(PRIMARY_NODE_NAME).await? else {
            return Ok(false);
        };
        if primary.status != NodeStatus::Active {
            return Ok(false);
        }
        let Some(node_id) = primary.id else {
            return Ok(false);
        };

        let gauges = match self.recursor.scrape_metrics().await {
            Ok(g) => g,
            Err(e) => {
                debug!(error = %e, "Could not scrape local recursor");
                return Ok(false);
            }
        };
        if gauges.is_empty() {
            return Ok(false);
        }

        let mut snapshot = metrics_from_gauges(&gauges);
        snapshot.node_id = node_id;
        snapshot.ts = Some(Utc::now());
        self.metrics.insert(&snapshot).await?;
        debug!("Collected local recursor metrics for primary node");
        Ok(true)
    }
}

/// Map `pdns_recursor_*` gauge names onto the snapshot columns.
pub fn metrics_from_gauges(gauges: &HashMap<String, i64>) -> NodeMetrics {
    let get = |key: &str| gauges.get(key).copied().unwrap_or(0);
    NodeMetrics {
        id: None,
        node_id: 0,
        ts: None,
        cache_hits: get("cache_hits"),
        cache_misses: get("cache_misses"),
        cache_entries: get("cache_entries"),
        packetcache_hits: get("packetcache_hits"),
        packetcache_misses: get("packetcache_misses"),
        answers_0_1: get("answers0_1"),
        answers_1_10: get("answers1_10"),
        answers_10_100: get("answers10_100"),
        answers_100_1000: get("answers100_1000"),
        answers_slow: get("answers_slow"),
        concurrent_queries: get("concurrent_queries"),
        outgoing_timeouts: get("outgoing_timeouts"),
        servfail_answers: get("servfail_answers"),
        nxdomain_answers: get("nxdomain_answers"),
        questions: get("questions"),
        all_outqueries: get("all_outqueries"),
        uptime_seconds: get("uptime_seconds"),
    }
}
