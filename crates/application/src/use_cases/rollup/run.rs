use crate::ports::{EventAggregate, EventRepository, RollupRepository};
use crate::services::SettingsService;
use chrono::{DateTime, Duration, Timelike, Utc};
use powerblockade_domain::{DomainError, Granularity, QueryRollup};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default)]
pub struct RollupReport {
    pub hourly: usize,
    pub daily: usize,
}

/// Time-bucketed aggregation: hourly cells from raw events, daily cells
/// from hourly. Upserts make re-runs over the same buckets idempotent.
pub struct RollupUseCase {
    events: Arc<dyn EventRepository>,
    rollups: Arc<dyn RollupRepository>,
    settings: Arc<SettingsService>,
}

impl RollupUseCase {
    pub fn new(
        events: Arc<dyn EventRepository>,
        rollups: Arc<dyn RollupRepository>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            events,
            rollups,
            settings,
        }
    }

    /// Aggregate one closed hour `[hour_start, hour_start + 1h)`.
    pub async fn run_hourly(&self, hour_start: DateTime<Utc>) -> Result<usize, DomainError> {
        let threshold = self.settings.cache_hit_threshold_ms().await?;
        let cells = self
            .events
            .aggregate_window(hour_start, hour_start + Duration::hours(1), threshold)
            .await?;

        for cell in &cells {
            self.rollups
                .upsert(&to_rollup(cell, hour_start, Granularity::Hourly))
                .await?;
        }
        Ok(cells.len())
    }

    /// Aggregate one closed day from its hourly cells.
    pub async fn run_daily(&self, day_start: DateTime<Utc>) -> Result<usize, DomainError> {
        let cells = self
            .rollups
            .aggregate_daily_from_hourly(day_start, day_start + Duration::days(1))
            .await?;

        for cell in &cells {
            self.rollups
                .upsert(&to_rollup(cell, day_start, Granularity::Daily))
                .await?;
        }
        Ok(cells.len())
    }

    /// Scheduler entry point: close out the previous hour; in the early
    /// local-morning window also close out the previous day.
    #[instrument(skip(self), name = "rollup_job")]
    pub async fn execute(&self) -> Result<RollupReport, DomainError> {
        if !self.settings.rollup_enabled().await? {
            return Ok(RollupReport::default());
        }
        let now = Utc::now();
        let current_hour = now
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);
        let previous_hour = current_hour - Duration::hours(1);

        let hourly = self.run_hourly(previous_hour).await?;

        let tz = self.settings.timezone().await?;
        let local_hour = now.with_timezone(&tz).hour();
        let daily = if local_hour < 2 {
            let current_day = current_hour
                .with_hour(0)
                .unwrap_or(current_hour);
            self.run_daily(current_day - Duration::days(1)).await?
        } else {
            0
        };

        info!(hourly, daily, "Rollup job completed");
        Ok(RollupReport { hourly, daily })
    }
}

fn to_rollup(
    cell: &EventAggregate,
    bucket_start: DateTime<Utc>,
    granularity: Granularity,
) -> QueryRollup {
    QueryRollup {
        id: None,
        bucket_start,
        granularity,
        client_id: cell.client_id,
        node_id: cell.node_id,
        total_queries: cell.total,
        blocked_queries: cell.blocked,
        nxdomain_count: cell.nxdomain,
        servfail_count: cell.servfail,
        cache_hits: cell.cache_hits,
        avg_latency_ms: cell.avg_latency_ms.map(|v| v as i64),
        unique_domains: cell.unique_domains,
    }
}
