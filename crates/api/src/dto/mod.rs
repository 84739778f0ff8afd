use chrono::{DateTime, Utc};
pub use powerblockade_application::use_cases::IncomingEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub version: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncAckResponse {
    pub ok: bool,
    pub config_version: String,
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub queries_total: Option<i64>,
    pub queries_blocked: Option<i64>,
    pub version: Option<String>,
}

/// Ingest body: events arrive as raw JSON values so one malformed event is
/// dropped instead of failing the whole batch.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub received: u64,
    pub node: String,
}

/// One event on the wire. `ts` is RFC 3339; absent means "server now".
#[derive(Debug, Deserialize)]
pub struct IngestEventDto {
    pub ts: Option<String>,
    pub client_ip: String,
    pub qname: String,
    pub qtype: u16,
    pub rcode: u8,
    #[serde(default)]
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub blocklist_name: Option<String>,
    pub latency_ms: Option<i64>,
    pub event_id: Option<String>,
    pub event_seq: Option<i64>,
}

impl IngestEventDto {
    pub fn into_incoming(self) -> IncomingEvent {
        let ts: Option<DateTime<Utc>> = self
            .ts
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|t| t.with_timezone(&Utc));
        IncomingEvent {
            ts,
            client_ip: self.client_ip,
            qname: self.qname,
            qtype: self.qtype,
            rcode: self.rcode,
            blocked: self.blocked,
            block_reason: self.block_reason,
            blocklist_name: self.blocklist_name,
            latency_ms: self.latency_ms,
            event_id: self.event_id,
            event_seq: self.event_seq,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NodeMetricsDto {
    #[serde(default)]
    pub cache_hits: i64,
    #[serde(default)]
    pub cache_misses: i64,
    #[serde(default)]
    pub cache_entries: i64,
    #[serde(default)]
    pub packetcache_hits: i64,
    #[serde(default)]
    pub packetcache_misses: i64,
    #[serde(default)]
    pub answers_0_1: i64,
    #[serde(default)]
    pub answers_1_10: i64,
    #[serde(default)]
    pub answers_10_100: i64,
    #[serde(default)]
    pub answers_100_1000: i64,
    #[serde(default)]
    pub answers_slow: i64,
    #[serde(default)]
    pub concurrent_queries: i64,
    #[serde(default)]
    pub outgoing_timeouts: i64,
    #[serde(default)]
    pub servfail_answers: i64,
    #[serde(default)]
    pub nxdomain_answers: i64,
    #[serde(default)]
    pub questions: i64,
    #[serde(default)]
    pub all_outqueries: i64,
    #[serde(default)]
    pub uptime_seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct CommandView {
    pub id: i64,
    pub command: String,
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CommandsResponse {
    pub commands: Vec<CommandView>,
}

#[derive(Debug, Deserialize)]
pub struct CommandResultRequest {
    pub id: i64,
    pub success: bool,
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePackageRequest {
    pub name: String,
    pub primary_url: String,
}

#[derive(Debug, Deserialize)]
pub struct PauseQuery {
    pub minutes: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Parse the raw event values, silently dropping any that fail validation.
pub fn parse_events(raw: Vec<serde_json::Value>) -> Vec<IncomingEvent> {
    raw.into_iter()
        .filter_map(|value| serde_json::from_value::<IngestEventDto>(value).ok())
        .map(IngestEventDto::into_incoming)
        .collect()
}
