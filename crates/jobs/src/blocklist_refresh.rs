use powerblockade_application::use_cases::RefreshBlocklistsUseCase;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct BlocklistRefreshJob {
    refresh: Arc<RefreshBlocklistsUseCase>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl BlocklistRefreshJob {
    pub fn new(refresh: Arc<RefreshBlocklistsUseCase>) -> Self {
        Self {
            refresh,
            interval_secs: 900,
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
            "Starting blocklist refresh job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("BlocklistRefreshJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.refresh.execute().await {
                            Ok(report) => {
                                if report.updated > 0 || report.failed > 0 {
                                    info!(
                                        updated = report.updated,
                                        failed = report.failed,
                                        "Blocklist refresh tick completed"
                                    );
                                }
                            }
                            Err(e) => error!(error = %e, "Blocklist refresh failed"),
                        }
                    }
                }
            }
        })
    }
}
