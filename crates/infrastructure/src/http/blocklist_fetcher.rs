use async_trait::async_trait;
use powerblockade_application::ports::{BlocklistFetcher, FetchOutcome};
use powerblockade_domain::DomainError;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, instrument};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const UA: &str = concat!("PowerBlockade/", env!("CARGO_PKG_VERSION"));

/// Conditional-GET blocklist downloader. Sends the stored validators so an
/// unchanged list costs a 304 instead of a multi-megabyte body.
pub struct HttpBlocklistFetcher {
    client: reqwest::Client,
}

impl HttpBlocklistFetcher {
    pub fn new() -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| DomainError::UpstreamFetch(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BlocklistFetcher for HttpBlocklistFetcher {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        url: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<FetchOutcome, DomainError> {
        let mut request = self.client.get(url).header(USER_AGENT, UA);
        if let Some(etag) = etag {
            request = request.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = last_modified {
            request = request.header(IF_MODIFIED_SINCE, last_modified);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::UpstreamFetch(format!("{url}: {e}")))?;

        if response.status() == StatusCode::NOT_MODIFIED {
            debug!(url, "Blocklist not modified");
            return Ok(FetchOutcome::NotModified);
        }
        if !response.status().is_success() {
            return Err(DomainError::UpstreamFetch(format!(
                "{url}: HTTP {}",
                response.status()
            )));
        }

        let header = |name| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let new_etag = header(ETAG);
        let new_last_modified = header(LAST_MODIFIED);

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::UpstreamFetch(format!("{url}: {e}")))?;

        Ok(FetchOutcome::Fetched {
            body,
            etag: new_etag,
            last_modified: new_last_modified,
        })
    }
}
