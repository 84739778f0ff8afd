use powerblockade_application::services::RecompileFlag;
use powerblockade_application::use_cases::{CompilePolicyUseCase, ManageBlockingUseCase};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Per-minute tick with two duties: flip an expired pause back to enabled,
/// and run any recompile that was requested since the last tick (enable,
/// resume, schedule flip).
pub struct BlockingResumeJob {
    blocking: Arc<ManageBlockingUseCase>,
    compile: Arc<CompilePolicyUseCase>,
    recompile: Arc<RecompileFlag>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl BlockingResumeJob {
    pub fn new(
        blocking: Arc<ManageBlockingUseCase>,
        compile: Arc<CompilePolicyUseCase>,
        recompile: Arc<RecompileFlag>,
    ) -> Self {
        Self {
            blocking,
            compile,
            recompile,
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
            "Starting blocking resume job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("BlockingResumeJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.blocking.resume_if_expired().await {
                            Ok(true) => info!("Blocking pause expired, recompile requested"),
                            Ok(false) => {}
                            Err(e) => error!(error = %e, "Blocking resume check failed"),
                        }

                        if self.recompile.take() {
                            if let Err(e) = self.compile.execute().await {
                                error!(error = %e, "Requested recompile failed");
                                // Try again next tick rather than dropping it.
                                self.recompile.request();
                            }
                        }
                    }
                }
            }
        })
    }
}
