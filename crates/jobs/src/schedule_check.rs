use powerblockade_application::use_cases::ScheduleCheckUseCase;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct ScheduleCheckJob {
    check: Arc<ScheduleCheckUseCase>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl ScheduleCheckJob {
    pub fn new(check: Arc<ScheduleCheckUseCase>) -> Self {
        Self {
            check,
            interval_secs: 300,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!(
            interval_secs = self.interval_secs,
            "Starting blocklist schedule job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("ScheduleCheckJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = self.check.execute().await {
                            error!(error = %e, "Schedule check failed");
                        }
                    }
                }
            }
        })
    }
}
