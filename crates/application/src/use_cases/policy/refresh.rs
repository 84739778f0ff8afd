use crate::ports::{BlocklistFetcher, BlocklistRepository, FetchOutcome};
use crate::use_cases::policy::CompilePolicyUseCase;
use chrono::Utc;
use powerblockade_domain::{policy, DomainError};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    pub updated: u32,
    pub not_modified: u32,
    pub failed: u32,
    pub recompiled: bool,
}

/// Periodic blocklist refresh: conditional GET per due list, entry
/// replacement, and a recompile when anything actually changed.
pub struct RefreshBlocklistsUseCase {
    blocklists: Arc<dyn BlocklistRepository>,
    fetcher: Arc<dyn BlocklistFetcher>,
    compile: Arc<CompilePolicyUseCase>,
}

impl RefreshBlocklistsUseCase {
    pub fn new(
        blocklists: Arc<dyn BlocklistRepository>,
        fetcher: Arc<dyn BlocklistFetcher>,
        compile: Arc<CompilePolicyUseCase>,
    ) -> Self {
        Self {
            blocklists,
            fetcher,
            compile,
        }
    }

    /// Refresh one list regardless of its due time (operator "update now").
    pub async fn refresh_one(&self, blocklist_id: i64) -> Result<RefreshReport, DomainError> {
        let bl = self
            .blocklists
            .get_by_id(blocklist_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("blocklist {blocklist_id}")))?;
        let mut report = RefreshReport::default();
        self.refresh_list(&bl, &mut report).await;
        if report.updated > 0 {
            self.recompile(&mut report).await;
        }
        Ok(report)
    }

    #[instrument(skip(self), name = "refresh_blocklists")]
    pub async fn execute(&self) -> Result<RefreshReport, DomainError> {
        let now = Utc::now();
        let mut report = RefreshReport::default();

        for bl in self.blocklists.get_enabled().await? {
            if !bl.refresh_due(now) {
                continue;
            }
            self.refresh_list(&bl, &mut report).await;
        }

        if report.updated > 0 {
            self.recompile(&mut report).await;
        }

        info!(
            updated = report.updated,
            not_modified = report.not_modified,
            failed = report.failed,
            "Blocklist refresh completed"
        );
        Ok(report)
    }

    async fn refresh_list(
        &self,
        bl: &powerblockade_domain::Blocklist,
        report: &mut RefreshReport,
    ) {
        let Some(id) = bl.id else { return };
        let now = Utc::now();

        let outcome = self
            .fetcher
            .fetch(&bl.url, bl.etag.as_deref(), bl.last_modified.as_deref())
            .await;

        match outcome {
            Ok(FetchOutcome::NotModified) => {
                if let Err(e) = self.blocklists.record_fetch_not_modified(id, now).await {
                    error!(error = %e, blocklist = %bl.name, "Failed to record 304");
                }
                report.not_modified += 1;
            }
            Ok(FetchOutcome::Fetched {
                body,
                etag,
                last_modified,
            }) => {
                let domains = policy::parse_blocklist_text(&body, bl.format);
                let count = domains.len() as i64;
                let result = async {
                    self.blocklists.replace_entries(id, &domains).await?;
                    self.blocklists
                        .record_fetch_success(
                            id,
                            count,
                            etag.as_deref(),
                            last_modified.as_deref(),
                            now,
                        )
                        .await
                }
                .await;

                match result {
                    Ok(()) => {
                        info!(blocklist = %bl.name, entries = count, "Blocklist updated");
                        report.updated += 1;
                    }
                    Err(e) => {
                        error!(error = %e, blocklist = %bl.name, "Failed to store entries");
                        report.failed += 1;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, blocklist = %bl.name, "Blocklist fetch failed");
                if let Err(e2) = self
                    .blocklists
                    .record_fetch_failure(id, &e.to_string(), now)
                    .await
                {
                    error!(error = %e2, blocklist = %bl.name, "Failed to record fetch failure");
                }
                report.failed += 1;
            }
        }
    }

    async fn recompile(&self, report: &mut RefreshReport) {
        match self.compile.execute().await {
            Ok(_) => report.recompiled = true,
            Err(e) => error!(error = %e, "Recompile after refresh failed"),
        }
    }
}
