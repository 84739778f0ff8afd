use async_trait::async_trait;
use powerblockade_domain::DomainError;

/// Builds the zipped deployment bundle handed to a new secondary.
#[async_trait]
pub trait PackageBuilder: Send + Sync {
    async fn build(
        &self,
        node_name: &str,
        primary_url: &str,
        node_api_key: &str,
    ) -> Result<Vec<u8>, DomainError>;
}

/// Cryptographic generation of node API keys (64-char URL-safe tokens).
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> String;
}
