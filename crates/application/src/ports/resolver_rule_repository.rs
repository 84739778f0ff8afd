use async_trait::async_trait;
use powerblockade_domain::{ClientResolverRule, DomainError};

#[async_trait]
pub trait ResolverRuleRepository: Send + Sync {
    /// Enabled rules in ascending priority, the order `RuleMatcher` expects.
    async fn get_enabled_ordered(&self) -> Result<Vec<ClientResolverRule>, DomainError>;

    async fn create(&self, rule: ClientResolverRule) -> Result<ClientResolverRule, DomainError>;

    async fn delete(&self, id: i64) -> Result<(), DomainError>;
}
