use crate::ports::RollupRepository;
use chrono::{Duration, Utc};
use powerblockade_domain::{DomainError, RollupTotals};
use std::sync::Arc;

/// Rollup-backed dashboard totals over the last N hours.
pub struct DashboardStatsUseCase {
    rollups: Arc<dyn RollupRepository>,
}

impl DashboardStatsUseCase {
    pub fn new(rollups: Arc<dyn RollupRepository>) -> Self {
        Self { rollups }
    }

    pub async fn execute(&self, hours: i64) -> Result<RollupTotals, DomainError> {
        self.rollups
            .totals_since(Utc::now() - Duration::hours(hours))
            .await
    }
}
