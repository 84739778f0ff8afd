use axum::http::{Method, StatusCode};
use powerblockade_application::ports::{BlocklistRepository as _, ForwardZoneRepository as _};
use powerblockade_domain::{Blocklist, BlocklistFormat, ForwardZone, ListType};
use serde_json::json;

mod helpers;
use helpers::{json_body, test_server, NODE_KEY};

#[tokio::test]
async fn missing_and_invalid_keys_both_get_401() {
    let server = test_server().await;

    let missing = server.get("/api/node-sync/config", None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    // One flipped byte in an otherwise valid key.
    let mut tampered = NODE_KEY.to_string();
    tampered.replace_range(0..1, "u");
    let invalid = server.get("/api/node-sync/config", Some(&tampered)).await;
    assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

    let garbage = server.get("/api/node-sync/config", Some("nope")).await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_binds_the_caller_and_returns_the_bundle_version() {
    let server = test_server().await;
    server.compile.execute().await.unwrap();

    let response = server
        .post(
            "/api/node-sync/register",
            Some(NODE_KEY),
            json!({"name": "edge-1", "version": "0.3.0", "ip_address": "192.0.2.10"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    let version = body["config_version"].as_str().unwrap();
    assert_eq!(version.len(), 12);
}

#[tokio::test]
async fn heartbeat_reflects_policy_changes_in_the_version() {
    let server = test_server().await;
    server.compile.execute().await.unwrap();

    let before = json_body(
        server
            .post("/api/node-sync/heartbeat", Some(NODE_KEY), json!({}))
            .await,
    )
    .await;
    let v0 = before["config_version"].as_str().unwrap().to_string();

    // Change policy: add a forward zone and recompile.
    server
        .forward_zones
        .create(ForwardZone::new("corp.example".to_string(), "10.0.0.9".to_string()))
        .await
        .unwrap();
    server.compile.execute().await.unwrap();

    let after = json_body(
        server
            .post(
                "/api/node-sync/heartbeat",
                Some(NODE_KEY),
                json!({"queries_total": 10, "queries_blocked": 2}),
            )
            .await,
    )
    .await;
    let v1 = after["config_version"].as_str().unwrap().to_string();
    assert_ne!(v0, v1);

    // The config bundle agrees with the heartbeat.
    let config = json_body(server.get("/api/node-sync/config", Some(NODE_KEY)).await).await;
    assert_eq!(config["config_version"].as_str().unwrap(), v1);
}

#[tokio::test]
async fn config_returns_rpz_files_with_checksums_and_override_zones() {
    let server = test_server().await;

    server
        .forward_zones
        .create(ForwardZone::new("corp.example".to_string(), "10.0.0.1".to_string()))
        .await
        .unwrap();
    let mut override_zone = ForwardZone::new("corp.example".to_string(), "10.1.0.1".to_string());
    override_zone.node_id = Some(server.node_id);
    server.forward_zones.create(override_zone).await.unwrap();

    let mut list = Blocklist::new(
        "ads".to_string(),
        "https://lists.example/ads.txt".to_string(),
        BlocklistFormat::Hosts,
        ListType::Block,
    );
    list.entry_count = 42;
    server.blocklists.create(list).await.unwrap();

    server.compile.execute().await.unwrap();

    let config = json_body(server.get("/api/node-sync/config", Some(NODE_KEY)).await).await;
    assert_eq!(config["ok"], true);

    let files = config["rpz_files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    for file in files {
        assert_eq!(file["checksum"].as_str().unwrap().len(), 16);
        assert!(file["content"].as_str().unwrap().contains("SOA"));
    }

    // The per-node override wins for the colliding domain.
    let zones = config["forward_zones"].as_array().unwrap();
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0]["domain"], "corp.example");
    assert_eq!(zones[0]["servers"], "10.1.0.1");
    assert_eq!(zones[0]["is_override"], true);

    assert_eq!(config["blocklists"][0]["name"], "ads");
    assert!(config["settings"]["retention_events_days"].is_string());
}

#[tokio::test]
async fn ingest_deduplicates_on_event_id_across_retries() {
    let server = test_server().await;

    let batch = json!({"events": [
        {"event_id": "E1", "client_ip": "10.0.0.1", "qname": "A.Example.COM.", "qtype": 1, "rcode": 0, "blocked": false},
        {"event_id": "E2", "client_ip": "10.0.0.1", "qname": "b.example.com", "qtype": 1, "rcode": 0, "blocked": true},
        {"event_id": "E1", "client_ip": "10.0.0.1", "qname": "a.example.com", "qtype": 1, "rcode": 0, "blocked": false}
    ]});

    let first = json_body(
        server
            .post("/api/node-sync/ingest", Some(NODE_KEY), batch.clone())
            .await,
    )
    .await;
    assert_eq!(first["received"], 2);
    assert_eq!(first["node"], "edge-1");

    let second = json_body(
        server
            .post("/api/node-sync/ingest", Some(NODE_KEY), batch)
            .await,
    )
    .await;
    assert_eq!(second["received"], 0);
}

#[tokio::test]
async fn malformed_events_are_dropped_silently() {
    let server = test_server().await;

    let batch = json!({"events": [
        {"event_id": "OK1", "client_ip": "10.0.0.1", "qname": "good.example", "qtype": 1, "rcode": 0},
        {"event_id": "BAD1", "client_ip": "not-an-ip", "qname": "x.example", "qtype": 1, "rcode": 0},
        {"event_id": "BAD2", "client_ip": "10.0.0.1", "qtype": 1, "rcode": 0},
        "not even an object"
    ]});

    let response = server
        .post("/api/node-sync/ingest", Some(NODE_KEY), batch)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["received"], 1);
}

#[tokio::test]
async fn metrics_push_and_command_channel_round_trip() {
    let server = test_server().await;

    let push = server
        .post(
            "/api/node-sync/metrics",
            Some(NODE_KEY),
            json!({"cache_hits": 100, "cache_misses": 20, "uptime_seconds": 3600}),
        )
        .await;
    assert_eq!(push.status(), StatusCode::OK);

    // Queue a broadcast clear_cache through the operator endpoint.
    let cleared = server
        .request(Method::POST, "/api/blocking/clear-cache", None, None)
        .await;
    assert_eq!(cleared.status(), StatusCode::OK);

    let commands = json_body(server.get("/api/node-sync/commands", Some(NODE_KEY)).await).await;
    let list = commands["commands"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["command"], "clear_cache");
    let command_id = list[0]["id"].as_i64().unwrap();

    let ack = server
        .post(
            "/api/node-sync/commands/result",
            Some(NODE_KEY),
            json!({"id": command_id, "success": true, "result": {"count": 12}}),
        )
        .await;
    assert_eq!(ack.status(), StatusCode::OK);

    let drained = json_body(server.get("/api/node-sync/commands", Some(NODE_KEY)).await).await;
    assert!(drained["commands"].as_array().unwrap().is_empty());
}
