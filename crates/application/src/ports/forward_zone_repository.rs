use async_trait::async_trait;
use powerblockade_domain::{DomainError, ForwardZone};

#[async_trait]
pub trait ForwardZoneRepository: Send + Sync {
    async fn create(&self, zone: ForwardZone) -> Result<ForwardZone, DomainError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<ForwardZone>, DomainError>;

    /// Enabled global zones (no node binding), ordered by domain. These feed
    /// the shared forward-zones.conf and the bundle version.
    async fn get_enabled_global(&self) -> Result<Vec<ForwardZone>, DomainError>;

    /// Enabled zones visible to one node: globals plus its overrides.
    async fn get_for_node(&self, node_id: i64) -> Result<Vec<ForwardZone>, DomainError>;

    async fn update(&self, zone: &ForwardZone) -> Result<(), DomainError>;

    async fn delete(&self, id: i64) -> Result<(), DomainError>;
}
