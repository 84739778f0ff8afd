use crate::dto::PauseQuery;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use powerblockade_application::use_cases::{BlockingStatus, CacheClearReport};
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
pub struct BlockingStatusResponse {
    pub state: String,
    pub active: bool,
    pub pause_remaining_seconds: Option<i64>,
}

impl From<BlockingStatus> for BlockingStatusResponse {
    fn from(status: BlockingStatus) -> Self {
        Self {
            state: status.state,
            active: status.active,
            pause_remaining_seconds: status.pause_remaining_seconds,
        }
    }
}

#[derive(Serialize)]
pub struct BlockingActionResponse {
    pub ok: bool,
    pub state: String,
    pub message: String,
}

pub async fn status(
    State(state): State<AppState>,
) -> Result<Json<BlockingStatusResponse>, ApiError> {
    Ok(Json(state.blocking.status().await?.into()))
}

#[instrument(skip(state), name = "api_blocking_enable")]
pub async fn enable(
    State(state): State<AppState>,
) -> Result<Json<BlockingActionResponse>, ApiError> {
    let status = state.blocking.enable(None).await?;
    Ok(Json(BlockingActionResponse {
        ok: true,
        state: status.state,
        message: "Blocking enabled. RPZ zones regenerate on the next cycle.".to_string(),
    }))
}

#[instrument(skip(state), name = "api_blocking_disable")]
pub async fn disable(
    State(state): State<AppState>,
) -> Result<Json<BlockingActionResponse>, ApiError> {
    let status = state.blocking.disable(None).await?;
    Ok(Json(BlockingActionResponse {
        ok: true,
        state: status.state,
        message: "Blocking disabled. RPZ zone cleared.".to_string(),
    }))
}

#[instrument(skip(state), name = "api_blocking_pause")]
pub async fn pause(
    State(state): State<AppState>,
    Query(query): Query<PauseQuery>,
) -> Result<Json<BlockingActionResponse>, ApiError> {
    let minutes = query.minutes.unwrap_or(15);
    let status = state.blocking.pause(minutes, None).await?;
    Ok(Json(BlockingActionResponse {
        ok: true,
        state: status.state,
        message: format!("Blocking paused for {minutes} minutes."),
    }))
}

#[derive(Serialize)]
pub struct ClearCacheResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub report: CacheClearReport,
}

#[instrument(skip(state), name = "api_clear_cache")]
pub async fn clear_cache(
    State(state): State<AppState>,
) -> Result<Json<ClearCacheResponse>, ApiError> {
    let report = state.clear_cache.execute(None).await?;
    Ok(Json(ClearCacheResponse { ok: true, report }))
}
