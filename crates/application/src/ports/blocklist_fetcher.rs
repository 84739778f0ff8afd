use async_trait::async_trait;
use powerblockade_domain::DomainError;

/// Outcome of a conditional blocklist download.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// 304: the stored entries are still current.
    NotModified,
    Fetched {
        body: String,
        etag: Option<String>,
        last_modified: Option<String>,
    },
}

/// HTTP download of a blocklist body with conditional-GET validators.
#[async_trait]
pub trait BlocklistFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<FetchOutcome, DomainError>;
}
