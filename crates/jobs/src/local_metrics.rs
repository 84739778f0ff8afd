use powerblockade_application::use_cases::ScrapeLocalMetricsUseCase;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Scrapes the colocated recursor's Prometheus page once a minute and
/// stores the snapshot under the primary node.
pub struct LocalMetricsJob {
    scrape: Arc<ScrapeLocalMetricsUseCase>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl LocalMetricsJob {
    pub fn new(scrape: Arc<ScrapeLocalMetricsUseCase>) -> Self {
        Self {
            scrape,
            interval_secs: 60,
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
            "Starting local metrics job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("LocalMetricsJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        // Scrape failures are routine while the recursor is
                        // restarting; they are logged at debug inside.
                        if let Err(e) = self.scrape.execute().await {
                            debug!(error = %e, "Local metrics collection failed");
                        }
                    }
                }
            }
        })
    }
}
