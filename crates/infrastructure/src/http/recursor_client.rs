use async_trait::async_trait;
use powerblockade_application::ports::RecursorClient;
use powerblockade_domain::DomainError;
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

const SCRAPE_TIMEOUT: Duration = Duration::from_secs(5);
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the recursor colocated with the primary: its Prometheus
/// page and its cache-flush API.
pub struct HttpRecursorClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpRecursorClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DomainError::UpstreamFetch(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

/// Parse a Prometheus text page down to the `pdns_recursor_*` gauges.
pub fn parse_recursor_metrics(text: &str) -> HashMap<String, i64> {
    let mut out = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Some(key) = name.strip_prefix("pdns_recursor_") else {
            continue;
        };
        if let Ok(v) = value.parse::<f64>() {
            out.insert(key.to_string(), v as i64);
        }
    }
    out
}

#[async_trait]
impl RecursorClient for HttpRecursorClient {
    #[instrument(skip(self))]
    async fn scrape_metrics(&self) -> Result<HashMap<String, i64>, DomainError> {
        let text = self
            .client
            .get(format!("{}/metrics", self.base_url))
            .timeout(SCRAPE_TIMEOUT)
            .send()
            .await
            .map_err(|e| DomainError::UpstreamFetch(e.to_string()))?
            .text()
            .await
            .map_err(|e| DomainError::UpstreamFetch(e.to_string()))?;

        Ok(parse_recursor_metrics(&text))
    }

    #[instrument(skip(self))]
    async fn flush_cache(&self) -> Result<u64, DomainError> {
        let mut request = self
            .client
            .delete(format!(
                "{}/api/v1/servers/localhost/cache/flush",
                self.base_url
            ))
            .query(&[("domain", ".")])
            .timeout(FLUSH_TIMEOUT);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::UpstreamFetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DomainError::UpstreamFetch(format!(
                "cache flush: HTTP {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DomainError::UpstreamFetch(e.to_string()))?;
        Ok(body.get("count").and_then(|c| c.as_u64()).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_recursor_gauges() {
        let page = "# HELP pdns_recursor_cache_hits hits\n\
                    pdns_recursor_cache_hits 1234\n\
                    pdns_recursor_uptime_seconds 86400.0\n\
                    go_goroutines 12\n\
                    malformed_line\n";
        let parsed = parse_recursor_metrics(page);
        assert_eq!(parsed.get("cache_hits"), Some(&1234));
        assert_eq!(parsed.get("uptime_seconds"), Some(&86400));
        assert_eq!(parsed.len(), 2);
    }
}
