use async_trait::async_trait;
use powerblockade_domain::{ConfigChange, DomainError};

#[async_trait]
pub trait ConfigChangeRepository: Send + Sync {
    async fn record(&self, change: ConfigChange) -> Result<ConfigChange, DomainError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<ConfigChange>, DomainError>;

    async fn recent(&self, limit: i64) -> Result<Vec<ConfigChange>, DomainError>;

    async fn for_entity(
        &self,
        entity_type: &str,
        entity_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<ConfigChange>, DomainError>;
}
