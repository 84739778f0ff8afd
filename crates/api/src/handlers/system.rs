use crate::auth::SessionUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use powerblockade_domain::DomainError;
use serde_json::json;
use tracing::info;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// Prometheus exposition; intentionally unauthenticated.
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.exporter.execute().await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}

/// Build identity; requires the external session layer to have stamped the
/// request, otherwise answers 401.
pub async fn version(
    State(state): State<AppState>,
    session: Option<Extension<SessionUser>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if session.is_none() {
        return Err(ApiError(DomainError::AuthMissing));
    }
    Ok(Json(json!({
        "version": state.version.version,
        "api_protocol_version": state.version.protocol_version,
        "api_protocol_min_supported": state.version.protocol_min_supported,
    })))
}

pub async fn rollback_change(
    State(state): State<AppState>,
    Path(change_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state.rollback.execute(change_id, None).await?;
    info!(change_id, action = %outcome.action, "Rollback applied");
    Ok(Json(json!({
        "ok": true,
        "action": outcome.action,
        "entity_type": outcome.entity_type,
    })))
}

#[derive(serde::Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

pub async fn search_domain(
    State(state): State<AppState>,
    axum::extract::Query(query): axum::extract::Query<SearchQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let hits = state.search.execute(&query.q).await?;
    Ok(Json(json!({ "results": hits })))
}

#[derive(serde::Deserialize)]
pub struct SummaryQuery {
    pub hours: Option<i64>,
}

/// Rollup-backed dashboard totals for the last N hours (default 24).
pub async fn analytics_summary(
    State(state): State<AppState>,
    axum::extract::Query(query): axum::extract::Query<SummaryQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let hours = query.hours.unwrap_or(24).clamp(1, 24 * 90);
    let totals = state.dashboard.execute(hours).await?;
    Ok(Json(json!({
        "hours": hours,
        "total_queries": totals.total_queries,
        "blocked_queries": totals.blocked_queries,
        "nxdomain_count": totals.nxdomain_count,
        "servfail_count": totals.servfail_count,
        "cache_hits": totals.cache_hits,
        "avg_latency_ms": totals.avg_latency_ms,
        "blocked_pct": totals.blocked_pct(),
        "cache_hit_pct": totals.cache_hit_pct(),
    })))
}

/// Operator "update now" for one blocklist, ignoring its refresh cadence.
pub async fn refresh_blocklist(
    State(state): State<AppState>,
    Path(blocklist_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state.refresh.refresh_one(blocklist_id).await?;
    Ok(Json(json!({
        "ok": true,
        "updated": report.updated,
        "not_modified": report.not_modified,
        "failed": report.failed,
        "recompiled": report.recompiled,
    })))
}

/// Freshness breakdown of the in-process precache TTL map.
pub async fn precache_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (cached, fresh, expired) = state.precache.stats();
    Json(json!({
        "cached_domains": cached,
        "fresh": fresh,
        "expired": expired,
    }))
}
