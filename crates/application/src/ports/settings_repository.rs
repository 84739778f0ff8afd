use async_trait::async_trait;
use powerblockade_domain::DomainError;

/// Plain string key/value store. Defaults and typed access live in
/// `services::SettingsService`.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;
}
