use async_trait::async_trait;
use powerblockade_domain::DomainError;
use std::collections::HashMap;

/// HTTP API of the recursor running next to the primary: Prometheus page
/// for the local-metrics job, cache flush for the clear-cache action.
#[async_trait]
pub trait RecursorClient: Send + Sync {
    /// Scrape and parse the `pdns_recursor_*` gauges into name → value.
    async fn scrape_metrics(&self) -> Result<HashMap<String, i64>, DomainError>;

    /// Flush the whole cache; returns the number of entries dropped.
    async fn flush_cache(&self) -> Result<u64, DomainError>;
}
