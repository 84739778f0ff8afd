use crate::dto::{GeneratePackageRequest, OkResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use tracing::instrument;

/// Download a deployment bundle for a (possibly new) secondary.
#[instrument(skip(state, payload), fields(node = %payload.name), name = "api_generate_package")]
pub async fn generate_package(
    State(state): State<AppState>,
    Json(payload): Json<GeneratePackageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (bytes, filename) = state
        .package
        .execute(&payload.name, &payload.primary_url)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

pub async fn force_sync(
    State(state): State<AppState>,
    Path(node_id): Path<i64>,
) -> Result<Json<OkResponse>, ApiError> {
    state.manage_nodes.force_sync(node_id).await?;
    Ok(Json(OkResponse { ok: true }))
}

pub async fn clear_error(
    State(state): State<AppState>,
    Path(node_id): Path<i64>,
) -> Result<Json<OkResponse>, ApiError> {
    state.manage_nodes.clear_error(node_id).await?;
    Ok(Json(OkResponse { ok: true }))
}

pub async fn delete_node(
    State(state): State<AppState>,
    Path(node_id): Path<i64>,
) -> Result<Json<OkResponse>, ApiError> {
    state.manage_nodes.delete(node_id, None).await?;
    Ok(Json(OkResponse { ok: true }))
}

pub async fn list_nodes(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let overviews = state.manage_nodes.list().await?;
    let nodes: Vec<serde_json::Value> = overviews
        .into_iter()
        .map(|o| {
            serde_json::json!({
                "id": o.node.id,
                "name": o.node.name,
                "status": o.node.status.as_str(),
                "health": o.health,
                "ip_address": o.node.ip_address,
                "version": o.node.version,
                "last_seen": o.node.last_seen,
                "queries_total": o.node.queries_total,
                "queries_blocked": o.node.queries_blocked,
            })
        })
        .collect();
    Ok(Json(serde_json::json!({ "nodes": nodes })))
}
