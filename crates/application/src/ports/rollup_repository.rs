use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_domain::{DomainError, QueryRollup, RollupTotals};

use super::event_repository::EventAggregate;

#[async_trait]
pub trait RollupRepository: Send + Sync {
    /// Insert or overwrite the cell keyed by
    /// `(bucket_start, granularity, client_id, node_id)`.
    async fn upsert(&self, rollup: &QueryRollup) -> Result<(), DomainError>;

    /// Sum the hourly rollups of `[day_start, day_end)` per
    /// `(client_id, node_id)`, averaging `avg_latency_ms` across hours.
    async fn aggregate_daily_from_hourly(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<EventAggregate>, DomainError>;

    /// Totals over hourly rollups since `cutoff`, for dashboards and the
    /// exporter.
    async fn totals_since(&self, cutoff: DateTime<Utc>) -> Result<RollupTotals, DomainError>;

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
