use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_domain::{DnsQueryEvent, DomainError};

/// One `(client, node)` aggregation cell produced by the hourly scan.
#[derive(Debug, Clone)]
pub struct EventAggregate {
    pub client_id: Option<i64>,
    pub node_id: Option<i64>,
    pub total: i64,
    pub blocked: i64,
    pub nxdomain: i64,
    pub servfail: i64,
    pub cache_hits: i64,
    pub avg_latency_ms: Option<f64>,
    pub unique_domains: i64,
}

/// 24 h event counters behind the Prometheus exporter.
#[derive(Debug, Clone, Default)]
pub struct EventWindowStats {
    pub total: i64,
    pub blocked: i64,
    pub cache_hits: i64,
    pub avg_latency_hit_ms: f64,
    pub avg_latency_miss_ms: f64,
}

/// Repository for the raw query-event stream.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Ingest one batch: upsert clients by IP, stamp their `last_seen`,
    /// resolve `client_id`s, insert events with duplicate `event_id`s
    /// silently skipped. Everything runs in a single transaction; the
    /// return value is the number of rows actually written.
    async fn ingest_batch(&self, events: Vec<DnsQueryEvent>) -> Result<u64, DomainError>;

    /// Group events in `[start, end)` by `(client_id, node_id)`.
    /// `cache_hit_threshold_ms` classifies sub-threshold latencies as hits.
    async fn aggregate_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cache_hit_threshold_ms: i64,
    ) -> Result<Vec<EventAggregate>, DomainError>;

    /// Most-queried successful unblocked domains since `since`.
    async fn top_domains(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<String>, DomainError>;

    /// Exporter window counters.
    async fn window_stats(
        &self,
        since: DateTime<Utc>,
        cache_hit_threshold_ms: i64,
    ) -> Result<EventWindowStats, DomainError>;

    /// Delete events older than `cutoff`, returning the row count.
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
