use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    Daily,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hourly" => Some(Granularity::Hourly),
            "daily" => Some(Granularity::Daily),
            _ => None,
        }
    }
}

/// Pre-aggregated counters for one `(bucket, client, node)` cell. Upserted
/// idempotently by the rollup job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRollup {
    pub id: Option<i64>,
    pub bucket_start: DateTime<Utc>,
    pub granularity: Granularity,
    pub client_id: Option<i64>,
    pub node_id: Option<i64>,
    pub total_queries: i64,
    pub blocked_queries: i64,
    pub nxdomain_count: i64,
    pub servfail_count: i64,
    pub cache_hits: i64,
    pub avg_latency_ms: Option<i64>,
    pub unique_domains: i64,
}

/// Totals over a window of hourly rollups, feeding the dashboard and the
/// Prometheus exporter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RollupTotals {
    pub total_queries: i64,
    pub blocked_queries: i64,
    pub nxdomain_count: i64,
    pub servfail_count: i64,
    pub cache_hits: i64,
    pub avg_latency_ms: i64,
}

impl RollupTotals {
    pub fn blocked_pct(&self) -> f64 {
        if self.total_queries == 0 {
            return 0.0;
        }
        self.blocked_queries as f64 / self.total_queries as f64 * 100.0
    }

    pub fn cache_hit_pct(&self) -> f64 {
        if self.total_queries == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / self.total_queries as f64 * 100.0
    }
}
