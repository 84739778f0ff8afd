use powerblockade_application::use_cases::PrecacheWarmUseCase;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct PrecacheJob {
    warmer: Arc<PrecacheWarmUseCase>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl PrecacheJob {
    pub fn new(warmer: Arc<PrecacheWarmUseCase>) -> Self {
        Self {
            warmer,
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
            "Starting precache warming job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("PrecacheJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        // The use case checks the enabled setting itself so
                        // operators can flip it without a restart.
                        if let Err(e) = self.warmer.execute().await {
                            error!(error = %e, "Precache warming failed");
                        }
                    }
                }
            }
        })
    }
}
