use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One resolver-counter snapshot pushed by a node's sync-agent (or scraped
/// locally for the primary). Field names mirror the `pdns_recursor_*`
/// Prometheus series they are parsed from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub id: Option<i64>,
    pub node_id: i64,
    pub ts: Option<DateTime<Utc>>,
    pub cache_hits: i64,
    pub cache_misses: i64,
    pub cache_entries: i64,
    pub packetcache_hits: i64,
    pub packetcache_misses: i64,
    pub answers_0_1: i64,
    pub answers_1_10: i64,
    pub answers_10_100: i64,
    pub answers_100_1000: i64,
    pub answers_slow: i64,
    pub concurrent_queries: i64,
    pub outgoing_timeouts: i64,
    pub servfail_answers: i64,
    pub nxdomain_answers: i64,
    pub questions: i64,
    pub all_outqueries: i64,
    pub uptime_seconds: i64,
}

impl NodeMetrics {
    pub fn cache_hit_rate(&self) -> Option<f64> {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            return None;
        }
        Some(self.cache_hits as f64 / total as f64 * 100.0)
    }
}
