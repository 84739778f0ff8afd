use crate::ports::{EventRepository, NodeMetricsRepository, RollupRepository};
use crate::services::SettingsService;
use chrono::{Duration, Utc};
use powerblockade_domain::DomainError;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default)]
pub struct RetentionReport {
    pub events_deleted: u64,
    pub rollups_deleted: u64,
    pub node_metrics_deleted: u64,
}

/// Deletes rows older than the per-table horizons configured in settings.
pub struct RetentionUseCase {
    events: Arc<dyn EventRepository>,
    rollups: Arc<dyn RollupRepository>,
    node_metrics: Arc<dyn NodeMetricsRepository>,
    settings: Arc<SettingsService>,
}

impl RetentionUseCase {
    pub fn new(
        events: Arc<dyn EventRepository>,
        rollups: Arc<dyn RollupRepository>,
        node_metrics: Arc<dyn NodeMetricsRepository>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            events,
            rollups,
            node_metrics,
            settings,
        }
    }

    #[instrument(skip(self), name = "retention_job")]
    pub async fn execute(&self) -> Result<RetentionReport, DomainError> {
        let now = Utc::now();

        let events_days = self.settings.retention_events_days().await?;
        let rollups_days = self.settings.retention_rollups_days().await?;
        let metrics_days = self.settings.retention_node_metrics_days().await?;

        let events_deleted = self
            .events
            .delete_before(now - Duration::days(events_days))
            .await?;
        let rollups_deleted = self
            .rollups
            .delete_before(now - Duration::days(rollups_days))
            .await?;
        let node_metrics_deleted = self
            .node_metrics
            .delete_before(now - Duration::days(metrics_days))
            .await?;

        info!(
            events_deleted,
            rollups_deleted, node_metrics_deleted, "Retention cleanup completed"
        );
        Ok(RetentionReport {
            events_deleted,
            rollups_deleted,
            node_metrics_deleted,
        })
    }
}
