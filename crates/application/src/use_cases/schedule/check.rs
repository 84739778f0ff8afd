use crate::ports::BlocklistRepository;
use crate::services::{AuditLog, SettingsService};
use crate::use_cases::audit::snapshots::blocklist_snapshot;
use crate::use_cases::policy::CompilePolicyUseCase;
use chrono::Utc;
use powerblockade_domain::{schedule, ConfigChange, DomainError};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Debug, Clone, Default)]
pub struct ScheduleReport {
    pub enabled: u32,
    pub disabled: u32,
}

/// Schedule engine tick: flip `enabled` on scheduled blocklists whose
/// window opened or closed, audit each flip, and recompile once after the
/// batch when anything changed.
pub struct ScheduleCheckUseCase {
    blocklists: Arc<dyn BlocklistRepository>,
    settings: Arc<SettingsService>,
    audit: Arc<AuditLog>,
    compile: Arc<CompilePolicyUseCase>,
}

impl ScheduleCheckUseCase {
    pub fn new(
        blocklists: Arc<dyn BlocklistRepository>,
        settings: Arc<SettingsService>,
        audit: Arc<AuditLog>,
        compile: Arc<CompilePolicyUseCase>,
    ) -> Self {
        Self {
            blocklists,
            settings,
            audit,
            compile,
        }
    }

    #[instrument(skip(self), name = "schedule_check")]
    pub async fn execute(&self) -> Result<ScheduleReport, DomainError> {
        let tz = self.settings.timezone().await?;
        let now_local = Utc::now().with_timezone(&tz);

        let mut report = ScheduleReport::default();
        let mut changed = false;

        for bl in self.blocklists.get_scheduled().await? {
            let should_be_active = schedule::blocklist_should_be_active(&bl, &now_local);
            if should_be_active == bl.enabled {
                continue;
            }
            let Some(id) = bl.id else { continue };

            let before = blocklist_snapshot(&bl);
            self.blocklists.set_enabled(id, should_be_active).await?;

            let mut after_bl = bl.clone();
            after_bl.enabled = should_be_active;
            self.audit
                .record(
                    ConfigChange::new("blocklist", Some(id), "toggle")
                        .with_before(before)
                        .with_after(blocklist_snapshot(&after_bl))
                        .with_comment("schedule".to_string()),
                )
                .await?;

            if should_be_active {
                report.enabled += 1;
                info!(blocklist = %bl.name, "Schedule enabled blocklist");
            } else {
                report.disabled += 1;
                info!(blocklist = %bl.name, "Schedule disabled blocklist");
            }
            changed = true;
        }

        if changed {
            if let Err(e) = self.compile.execute().await {
                error!(error = %e, "Recompile after schedule change failed");
            }
            info!(
                enabled = report.enabled,
                disabled = report.disabled,
                "Schedule check applied changes"
            );
        }

        Ok(report)
    }
}
