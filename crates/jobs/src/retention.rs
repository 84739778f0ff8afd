use crate::clock::until_next_time_of_day;
use chrono::Utc;
use powerblockade_application::use_cases::RetentionUseCase;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Daily cleanup of events, rollups and node metrics past their horizons.
pub struct RetentionJob {
    retention: Arc<RetentionUseCase>,
    hour: u32,
    minute: u32,
    shutdown: CancellationToken,
}

impl RetentionJob {
    pub fn new(retention: Arc<RetentionUseCase>) -> Self {
        Self {
            retention,
            hour: 3,
            minute: 0,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_time_of_day(mut self, hour: u32, minute: u32) -> Self {
        self.hour = hour;
        self.minute = minute;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!(hour = self.hour, minute = self.minute, "Starting retention job");

        tokio::spawn(async move {
            loop {
                let wait = until_next_time_of_day(Utc::now(), self.hour, self.minute);
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("RetentionJob: shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(wait) => {
                        match self.retention.execute().await {
                            Ok(report) => {
                                info!(
                                    events = report.events_deleted,
                                    rollups = report.rollups_deleted,
                                    node_metrics = report.node_metrics_deleted,
                                    "Retention cleanup completed"
                                );
                            }
                            Err(e) => error!(error = %e, "Retention cleanup failed"),
                        }
                    }
                }
            }
        })
    }
}
