use crate::{
    BlockingResumeJob, BlocklistRefreshJob, LocalMetricsJob, PrecacheJob, RetentionJob, RollupJob,
    ScheduleCheckJob,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Central orchestrator for all background jobs.
///
/// Register jobs with the builder, call `.start()` once, and keep the
/// returned handle for graceful shutdown. Every job shares the runner's
/// cancellation token; each runs as a single task, so a job can never
/// overlap itself.
pub struct JobRunner {
    shutdown: CancellationToken,
    blocklist_refresh: Option<BlocklistRefreshJob>,
    schedule_check: Option<ScheduleCheckJob>,
    rollup: Option<RollupJob>,
    retention: Option<RetentionJob>,
    precache: Option<PrecacheJob>,
    local_metrics: Option<LocalMetricsJob>,
    blocking_resume: Option<BlockingResumeJob>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            shutdown: CancellationToken::new(),
            blocklist_refresh: None,
            schedule_check: None,
            rollup: None,
            retention: None,
            precache: None,
            local_metrics: None,
            blocking_resume: None,
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn with_blocklist_refresh(mut self, job: BlocklistRefreshJob) -> Self {
        self.blocklist_refresh = Some(job.with_cancellation(self.shutdown.clone()));
        self
    }

    pub fn with_schedule_check(mut self, job: ScheduleCheckJob) -> Self {
        self.schedule_check = Some(job.with_cancellation(self.shutdown.clone()));
        self
    }

    pub fn with_rollup(mut self, job: RollupJob) -> Self {
        self.rollup = Some(job.with_cancellation(self.shutdown.clone()));
        self
    }

    pub fn with_retention(mut self, job: RetentionJob) -> Self {
        self.retention = Some(job.with_cancellation(self.shutdown.clone()));
        self
    }

    pub fn with_precache(mut self, job: PrecacheJob) -> Self {
        self.precache = Some(job.with_cancellation(self.shutdown.clone()));
        self
    }

    pub fn with_local_metrics(mut self, job: LocalMetricsJob) -> Self {
        self.local_metrics = Some(job.with_cancellation(self.shutdown.clone()));
        self
    }

    pub fn with_blocking_resume(mut self, job: BlockingResumeJob) -> Self {
        self.blocking_resume = Some(job.with_cancellation(self.shutdown.clone()));
        self
    }

    /// Start all registered background jobs.
    pub async fn start(self) -> JobRunnerHandle {
        info!("Starting background job runner");
        let mut handles = Vec::new();

        if let Some(job) = self.blocklist_refresh {
            handles.push(Arc::new(job).start().await);
        }
        if let Some(job) = self.schedule_check {
            handles.push(Arc::new(job).start().await);
        }
        if let Some(job) = self.rollup {
            handles.push(Arc::new(job).start().await);
        }
        if let Some(job) = self.retention {
            handles.push(Arc::new(job).start().await);
        }
        if let Some(job) = self.precache {
            handles.push(Arc::new(job).start().await);
        }
        if let Some(job) = self.local_metrics {
            handles.push(Arc::new(job).start().await);
        }
        if let Some(job) = self.blocking_resume {
            handles.push(Arc::new(job).start().await);
        }

        info!(jobs = handles.len(), "All background jobs started");
        JobRunnerHandle {
            shutdown: self.shutdown,
            handles,
        }
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}

pub struct JobRunnerHandle {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl JobRunnerHandle {
    /// Cancel all jobs and wait up to `grace` for in-flight runs to finish.
    pub async fn shutdown(self, grace: Duration) {
        info!("Stopping background job runner");
        self.shutdown.cancel();

        let drain = async {
            for handle in self.handles {
                let _ = handle.await;
            }
        };
        if tokio::time::timeout(grace, drain).await.is_err() {
            warn!("Background jobs did not stop within the grace period");
        }
    }
}
