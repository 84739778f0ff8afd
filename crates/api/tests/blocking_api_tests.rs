use axum::http::{Method, StatusCode};
use powerblockade_application::ports::NodeRepository as _;
use serde_json::json;

mod helpers;
use helpers::{json_body, test_server, text_body};

#[tokio::test]
async fn health_and_metrics_are_unauthenticated() {
    let server = test_server().await;

    let health = server.get("/health", None).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(json_body(health).await["ok"], true);

    let metrics = server.get("/metrics", None).await;
    assert_eq!(metrics.status(), StatusCode::OK);
    let body = text_body(metrics).await;
    assert!(body.contains("powerblockade_queries_total"));
    assert!(body.contains("powerblockade_qps"));
}

#[tokio::test]
async fn version_requires_a_session() {
    let server = test_server().await;
    let response = server.get("/api/version", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn disable_then_status_then_enable() {
    let server = test_server().await;

    let disabled = json_body(
        server
            .request(Method::POST, "/api/blocking/disable", None, None)
            .await,
    )
    .await;
    assert_eq!(disabled["state"], "disabled");

    let status = json_body(server.get("/api/blocking/status", None).await).await;
    assert_eq!(status["active"], false);
    assert_eq!(status["state"], "disabled");

    let enabled = json_body(
        server
            .request(Method::POST, "/api/blocking/enable", None, None)
            .await,
    )
    .await;
    assert_eq!(enabled["state"], "enabled");

    let status = json_body(server.get("/api/blocking/status", None).await).await;
    assert_eq!(status["active"], true);
}

#[tokio::test]
async fn pause_reports_remaining_seconds_and_validates_minutes() {
    let server = test_server().await;

    let paused = server
        .request(Method::POST, "/api/blocking/pause?minutes=5", None, None)
        .await;
    assert_eq!(paused.status(), StatusCode::OK);

    let status = json_body(server.get("/api/blocking/status", None).await).await;
    assert_eq!(status["active"], false);
    let remaining = status["pause_remaining_seconds"].as_i64().unwrap();
    assert!(remaining > 0 && remaining <= 300);

    let bad = server
        .request(Method::POST, "/api/blocking/pause?minutes=0", None, None)
        .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let too_long = server
        .request(Method::POST, "/api/blocking/pause?minutes=2000", None, None)
        .await;
    assert_eq!(too_long.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_package_returns_a_zip_attachment() {
    let server = test_server().await;

    let response = server
        .post(
            "/api/nodes/generate",
            None,
            json!({"name": "edge-2", "primary_url": "https://pb.example"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/zip"
    );
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("powerblockade-secondary-edge-2.zip"));

    // Idempotent on name: a second download succeeds for the same node.
    let again = server
        .post(
            "/api/nodes/generate",
            None,
            json!({"name": "edge-2", "primary_url": "https://pb.example"}),
        )
        .await;
    assert_eq!(again.status(), StatusCode::OK);
}

#[tokio::test]
async fn analytics_summary_and_precache_stats_respond_empty() {
    let server = test_server().await;

    let summary = json_body(server.get("/api/analytics/summary?hours=24", None).await).await;
    assert_eq!(summary["total_queries"], 0);
    assert_eq!(summary["blocked_pct"], 0.0);

    let stats = json_body(server.get("/api/precache/stats", None).await).await;
    assert_eq!(stats["cached_domains"], 0);
}

#[tokio::test]
async fn refreshing_an_unknown_blocklist_is_404() {
    let server = test_server().await;
    let response = server
        .request(Method::POST, "/api/blocklists/9999/refresh", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn primary_node_cannot_be_deleted() {
    let server = test_server().await;

    // Seed the primary row the way boot does.
    let primary = server
        .nodes
        .ensure_node("primary", "primary-key", chrono::Utc::now())
        .await
        .unwrap();

    let response = server
        .request(
            Method::DELETE,
            &format!("/api/nodes/{}", primary.id.unwrap()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let ok = server
        .request(
            Method::DELETE,
            &format!("/api/nodes/{}", server.node_id),
            None,
            None,
        )
        .await;
    assert_eq!(ok.status(), StatusCode::OK);
}
