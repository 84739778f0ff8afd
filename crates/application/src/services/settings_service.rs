use crate::ports::SettingsRepository;
use chrono_tz::Tz;
use powerblockade_domain::{settings, BlockingState, DomainError};
use std::sync::Arc;
use tracing::warn;

/// Typed access to the settings table with built-in defaults.
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, key: &str) -> Result<String, DomainError> {
        Ok(self
            .repo
            .get(key)
            .await?
            .unwrap_or_else(|| settings::default_for(key).to_string()))
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.repo.set(key, value).await
    }

    async fn get_i64(&self, key: &str) -> Result<i64, DomainError> {
        let raw = self.get(key).await?;
        Ok(raw
            .parse()
            .unwrap_or_else(|_| settings::default_for(key).parse().unwrap_or(0)))
    }

    async fn get_bool(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.eq_ignore_ascii_case("true"))
    }

    pub async fn blocking_state(&self) -> Result<BlockingState, DomainError> {
        Ok(BlockingState::parse(&self.get(settings::BLOCKING_STATE).await?))
    }

    pub async fn set_blocking_state(&self, state: &BlockingState) -> Result<(), DomainError> {
        self.set(settings::BLOCKING_STATE, &state.as_setting_value())
            .await
    }

    /// Current compiled bundle version; empty until the first compile.
    pub async fn config_version(&self) -> Result<String, DomainError> {
        self.get(settings::CONFIG_VERSION).await
    }

    pub async fn set_config_version(&self, version: &str) -> Result<(), DomainError> {
        self.set(settings::CONFIG_VERSION, version).await
    }

    /// Operator timezone for schedule evaluation; bad values fall back to
    /// UTC with a warning rather than disabling schedules.
    pub async fn timezone(&self) -> Result<Tz, DomainError> {
        let raw = self.get(settings::TIMEZONE).await?;
        Ok(raw.parse().unwrap_or_else(|_| {
            warn!(timezone = %raw, "Invalid timezone setting, falling back to UTC");
            chrono_tz::UTC
        }))
    }

    pub async fn retention_events_days(&self) -> Result<i64, DomainError> {
        self.get_i64(settings::RETENTION_EVENTS_DAYS).await
    }

    pub async fn retention_rollups_days(&self) -> Result<i64, DomainError> {
        self.get_i64(settings::RETENTION_ROLLUPS_DAYS).await
    }

    pub async fn retention_node_metrics_days(&self) -> Result<i64, DomainError> {
        self.get_i64(settings::RETENTION_NODE_METRICS_DAYS).await
    }

    pub async fn cache_hit_threshold_ms(&self) -> Result<i64, DomainError> {
        self.get_i64(settings::CACHE_HIT_THRESHOLD_MS).await
    }

    pub async fn rollup_enabled(&self) -> Result<bool, DomainError> {
        self.get_bool(settings::ROLLUP_ENABLED).await
    }

    pub async fn ptr_resolution_enabled(&self) -> Result<bool, DomainError> {
        self.get_bool(settings::PTR_RESOLUTION_ENABLED).await
    }

    pub async fn precache_enabled(&self) -> Result<bool, DomainError> {
        self.get_bool(settings::PRECACHE_ENABLED).await
    }

    pub async fn precache_domain_count(&self) -> Result<i64, DomainError> {
        self.get_i64(settings::PRECACHE_DOMAIN_COUNT).await
    }

    pub async fn precache_ignore_ttl(&self) -> Result<bool, DomainError> {
        self.get_bool(settings::PRECACHE_IGNORE_TTL).await
    }

    pub async fn precache_custom_refresh_minutes(&self) -> Result<i64, DomainError> {
        self.get_i64(settings::PRECACHE_CUSTOM_REFRESH_MINUTES).await
    }
}
