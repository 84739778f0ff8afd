use crate::auth::AuthedNode;
use crate::dto::{
    parse_events, CommandResultRequest, CommandView, CommandsResponse, HeartbeatRequest,
    IngestRequest, IngestResponse, NodeMetricsDto, OkResponse, RegisterRequest, SyncAckResponse,
};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use powerblockade_application::use_cases::NodeConfigBundle;
use powerblockade_domain::NodeMetrics;
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
pub struct ConfigResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub bundle: NodeConfigBundle,
}

#[instrument(skip(state, node, payload), fields(node = %payload.name), name = "api_register")]
pub async fn register(
    State(state): State<AppState>,
    node: AuthedNode,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<SyncAckResponse>, ApiError> {
    let node_id = node.0.id.unwrap_or_default();
    let config_version = state
        .node_sync
        .register(
            node_id,
            payload.name.trim(),
            payload.ip_address.as_deref(),
            payload.version.as_deref(),
        )
        .await?;
    Ok(Json(SyncAckResponse {
        ok: true,
        config_version,
    }))
}

pub async fn heartbeat(
    State(state): State<AppState>,
    node: AuthedNode,
    Json(payload): Json<HeartbeatRequest>,
) -> Result<Json<SyncAckResponse>, ApiError> {
    let node_id = node.0.id.unwrap_or_default();
    let config_version = state
        .node_sync
        .heartbeat(
            node_id,
            payload.version.as_deref(),
            payload.queries_total,
            payload.queries_blocked,
        )
        .await?;
    Ok(Json(SyncAckResponse {
        ok: true,
        config_version,
    }))
}

#[instrument(skip(state, node), fields(node = %node.0.name), name = "api_node_config")]
pub async fn config(
    State(state): State<AppState>,
    node: AuthedNode,
) -> Result<Json<ConfigResponse>, ApiError> {
    let bundle = state.node_sync.config(node.0.id.unwrap_or_default()).await?;
    Ok(Json(ConfigResponse { ok: true, bundle }))
}

#[instrument(
    skip(state, node, payload),
    fields(node = %node.0.name, batch = payload.events.len()),
    name = "api_ingest"
)]
pub async fn ingest(
    State(state): State<AppState>,
    node: AuthedNode,
    Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let events = parse_events(payload.events);
    let received = state
        .ingest
        .execute(node.0.id.unwrap_or_default(), events)
        .await?;
    Ok(Json(IngestResponse {
        ok: true,
        received,
        node: node.0.name,
    }))
}

pub async fn push_metrics(
    State(state): State<AppState>,
    node: AuthedNode,
    Json(payload): Json<NodeMetricsDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let metrics = NodeMetrics {
        cache_hits: payload.cache_hits,
        cache_misses: payload.cache_misses,
        cache_entries: payload.cache_entries,
        packetcache_hits: payload.packetcache_hits,
        packetcache_misses: payload.packetcache_misses,
        answers_0_1: payload.answers_0_1,
        answers_1_10: payload.answers_1_10,
        answers_10_100: payload.answers_10_100,
        answers_100_1000: payload.answers_100_1000,
        answers_slow: payload.answers_slow,
        concurrent_queries: payload.concurrent_queries,
        outgoing_timeouts: payload.outgoing_timeouts,
        servfail_answers: payload.servfail_answers,
        nxdomain_answers: payload.nxdomain_answers,
        questions: payload.questions,
        all_outqueries: payload.all_outqueries,
        uptime_seconds: payload.uptime_seconds,
        ..NodeMetrics::default()
    };
    state
        .record_metrics
        .execute(node.0.id.unwrap_or_default(), metrics)
        .await?;
    Ok(Json(serde_json::json!({ "ok": true, "node": node.0.name })))
}

pub async fn poll_commands(
    State(state): State<AppState>,
    node: AuthedNode,
) -> Result<Json<CommandsResponse>, ApiError> {
    let commands = state
        .node_sync
        .poll_commands(node.0.id.unwrap_or_default())
        .await?
        .into_iter()
        .filter_map(|cmd| {
            cmd.id.map(|id| CommandView {
                id,
                command: cmd.command,
                params: cmd.params,
            })
        })
        .collect();
    Ok(Json(CommandsResponse { commands }))
}

pub async fn command_result(
    State(state): State<AppState>,
    node: AuthedNode,
    Json(payload): Json<CommandResultRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    state
        .node_sync
        .report_command_result(
            node.0.id.unwrap_or_default(),
            payload.id,
            payload.success,
            payload.result,
        )
        .await?;
    Ok(Json(OkResponse { ok: true }))
}
