use crate::ports::{PolicyStore, RPZ_COMBINED_FILENAME};
use crate::services::{AuditLog, RecompileFlag, SettingsService};
use crate::use_cases::audit::snapshots::blocking_state_snapshot;
use chrono::{Duration, Utc};
use powerblockade_domain::{policy, BlockingState, ConfigChange, DomainError};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct BlockingStatus {
    pub state: String,
    pub active: bool,
    pub pause_remaining_seconds: Option<i64>,
}

/// The blocking state machine: enabled / disabled / paused-until.
///
/// Disable and pause replace the combined zone with an empty override
/// before returning; enable only requests a recompile, which the next
/// scheduler tick performs.
pub struct ManageBlockingUseCase {
    settings: Arc<SettingsService>,
    store: Arc<dyn PolicyStore>,
    audit: Arc<AuditLog>,
    recompile: Arc<RecompileFlag>,
}

impl ManageBlockingUseCase {
    pub fn new(
        settings: Arc<SettingsService>,
        store: Arc<dyn PolicyStore>,
        audit: Arc<AuditLog>,
        recompile: Arc<RecompileFlag>,
    ) -> Self {
        Self {
            settings,
            store,
            audit,
            recompile,
        }
    }

    pub async fn status(&self) -> Result<BlockingStatus, DomainError> {
        let now = Utc::now();
        let state = self.settings.blocking_state().await?;
        Ok(BlockingStatus {
            state: state.as_setting_value(),
            active: state.is_active(now),
            pause_remaining_seconds: state.pause_remaining_seconds(now),
        })
    }

    #[instrument(skip(self))]
    pub async fn enable(&self, actor_user_id: Option<i64>) -> Result<BlockingStatus, DomainError> {
        let old = self.settings.blocking_state().await?;
        self.settings
            .set_blocking_state(&BlockingState::Enabled)
            .await?;
        self.recompile.request();

        self.record_transition(&old, &BlockingState::Enabled, "blocking_enable", actor_user_id)
            .await?;
        info!("Blocking ENABLED");
        self.status().await
    }

    #[instrument(skip(self))]
    pub async fn disable(&self, actor_user_id: Option<i64>) -> Result<BlockingStatus, DomainError> {
        let old = self.settings.blocking_state().await?;
        self.settings
            .set_blocking_state(&BlockingState::Disabled)
            .await?;
        self.write_override().await?;

        self.record_transition(&old, &BlockingState::Disabled, "blocking_disable", actor_user_id)
            .await?;
        warn!("Blocking DISABLED, RPZ zone cleared");
        self.status().await
    }

    #[instrument(skip(self))]
    pub async fn pause(
        &self,
        minutes: i64,
        actor_user_id: Option<i64>,
    ) -> Result<BlockingStatus, DomainError> {
        BlockingState::validate_pause_minutes(minutes).map_err(DomainError::Validation)?;

        let old = self.settings.blocking_state().await?;
        let until = Utc::now() + Duration::minutes(minutes);
        let new = BlockingState::PausedUntil(until);
        self.settings.set_blocking_state(&new).await?;
        self.write_override().await?;

        self.record_transition(&old, &new, "blocking_pause", actor_user_id)
            .await?;
        warn!(minutes, "Blocking PAUSED");
        self.status().await
    }

    /// Scheduler tick: expired pauses flip back to enabled and request a
    /// recompile. Returns true when a transition happened.
    pub async fn resume_if_expired(&self) -> Result<bool, DomainError> {
        let now = Utc::now();
        let state = self.settings.blocking_state().await?;
        let BlockingState::PausedUntil(until) = state else {
            return Ok(false);
        };
        if now < until {
            return Ok(false);
        }

        self.settings
            .set_blocking_state(&BlockingState::Enabled)
            .await?;
        self.recompile.request();
        self.record_transition(&state, &BlockingState::Enabled, "blocking_resume", None)
            .await?;
        info!("Blocking pause expired, re-enabled");
        Ok(true)
    }

    async fn write_override(&self) -> Result<(), DomainError> {
        let zone = policy::render_empty_zone(Utc::now().timestamp());
        self.store.write_rpz(RPZ_COMBINED_FILENAME, &zone).await
    }

    async fn record_transition(
        &self,
        old: &BlockingState,
        new: &BlockingState,
        action: &str,
        actor_user_id: Option<i64>,
    ) -> Result<(), DomainError> {
        self.audit
            .record(
                ConfigChange::new("settings", Some(0), action)
                    .with_actor(actor_user_id)
                    .with_before(blocking_state_snapshot(&old.as_setting_value()))
                    .with_after(blocking_state_snapshot(&new.as_setting_value())),
            )
            .await
    }
}
