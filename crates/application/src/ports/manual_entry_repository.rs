use async_trait::async_trait;
use powerblockade_domain::{DomainError, ManualEntry};

#[async_trait]
pub trait ManualEntryRepository: Send + Sync {
    async fn create(&self, entry: ManualEntry) -> Result<ManualEntry, DomainError>;

    async fn get_all(&self) -> Result<Vec<ManualEntry>, DomainError>;

    async fn get_by_domain(&self, domain: &str) -> Result<Option<ManualEntry>, DomainError>;

    async fn delete(&self, id: i64) -> Result<(), DomainError>;
}
