use crate::clock::until_next_minute_of_hour;
use chrono::Utc;
use powerblockade_application::use_cases::RollupUseCase;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Fires at five past every hour, closing out the previous hour (and, in
/// the early-morning window, the previous day).
pub struct RollupJob {
    rollup: Arc<RollupUseCase>,
    minute_of_hour: u32,
    shutdown: CancellationToken,
}

impl RollupJob {
    pub fn new(rollup: Arc<RollupUseCase>) -> Self {
        Self {
            rollup,
            minute_of_hour: 5,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!(minute_of_hour = self.minute_of_hour, "Starting rollup job");

        tokio::spawn(async move {
            loop {
                let wait = until_next_minute_of_hour(Utc::now(), self.minute_of_hour);
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("RollupJob: shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(wait) => {
                        match self.rollup.execute().await {
                            Ok(report) => {
                                info!(hourly = report.hourly, daily = report.daily, "Rollup completed");
                            }
                            Err(e) => error!(error = %e, "Rollup failed"),
                        }
                    }
                }
            }
        })
    }
}
