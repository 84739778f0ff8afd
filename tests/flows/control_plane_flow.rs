//! End-to-end flows over the real use-case graph: policy compile → node
//! sync → ingest → rollup, plus the blocking override on disk.

use chrono::{Duration, Utc};
use powerblockade_application::ports::{
    BlocklistRepository as _, ClientRepository as _, ForwardZoneRepository as _,
    ManualEntryRepository as _, NodeRepository as _, ResolverRuleRepository as _,
};
use powerblockade_application::use_cases::IncomingEvent;
use powerblockade_domain::{
    Blocklist, BlocklistFormat, BlockingState, ClientResolverRule, ForwardZone, ListType,
    ManualEntry, Node,
};
use std::collections::BTreeSet;

#[path = "../common/fixtures.rs"]
mod fixtures;
use fixtures::control_plane;

fn incoming(event_id: &str, ip: &str, qname: &str) -> IncomingEvent {
    IncomingEvent {
        ts: None,
        client_ip: ip.to_string(),
        qname: qname.to_string(),
        qtype: 1,
        rcode: 0,
        blocked: false,
        block_reason: None,
        blocklist_name: None,
        latency_ms: Some(12),
        event_id: Some(event_id.to_string()),
        event_seq: None,
    }
}

#[tokio::test]
async fn policy_flows_from_lists_to_disk_to_nodes() {
    let cp = control_plane().await;

    // Subscribe a block list with stored entries and pin one allow domain.
    let mut list = Blocklist::new(
        "ads".to_string(),
        "https://lists.example/ads.txt".to_string(),
        BlocklistFormat::Hosts,
        ListType::Block,
    );
    list.last_update_status = Some("success".to_string());
    let list = cp.blocklists.create(list).await.unwrap();
    let entries: BTreeSet<String> = ["ads.example.com", "ok.example.com", "tracker.example.net"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    cp.blocklists
        .replace_entries(list.id.unwrap(), &entries)
        .await
        .unwrap();
    cp.manual
        .create(ManualEntry {
            id: None,
            domain: "ok.example.com".to_string(),
            entry_type: ListType::Allow,
            created_at: None,
        })
        .await
        .unwrap();
    cp.forward_zones
        .create(ForwardZone::new("corp.example".to_string(), "10.0.0.1".to_string()))
        .await
        .unwrap();

    let report = cp.compile.execute().await.unwrap();
    assert_eq!(report.blocked_count, 2);
    assert_eq!(report.allow_count, 1);

    // The shared directory holds exactly the three policy artifacts.
    let combined = std::fs::read_to_string(
        cp.shared_dir.path().join("rpz").join("blocklist-combined.rpz"),
    )
    .unwrap();
    assert!(combined.contains("ads.example.com. CNAME .\n"));
    assert!(!combined.contains("ok.example.com. CNAME .\n"));
    let conf =
        std::fs::read_to_string(cp.shared_dir.path().join("forward-zones.conf")).unwrap();
    assert!(conf.contains("corp.example=10.0.0.1"));

    // A node registers and pulls the same version through the protocol.
    let node = cp
        .nodes
        .create(Node::new("edge-1".to_string(), "edge-key".to_string()))
        .await
        .unwrap();
    let node_id = node.id.unwrap();
    let registered_version = cp
        .node_sync
        .register(node_id, "edge-1", Some("192.0.2.20"), None)
        .await
        .unwrap();
    assert_eq!(registered_version, report.config_version);

    let bundle = cp.node_sync.config(node_id).await.unwrap();
    assert_eq!(bundle.config_version, report.config_version);
    assert_eq!(bundle.rpz_files.len(), 2);

    // Policy change → new version observable on the next heartbeat.
    cp.manual
        .create(ManualEntry {
            id: None,
            domain: "tracker.example.net".to_string(),
            entry_type: ListType::Allow,
            created_at: None,
        })
        .await
        .unwrap();
    let second = cp.compile.execute().await.unwrap();
    assert_ne!(second.config_version, report.config_version);

    let heartbeat_version = cp
        .node_sync
        .heartbeat(node_id, None, Some(5), Some(1))
        .await
        .unwrap();
    assert_eq!(heartbeat_version, second.config_version);
}

#[tokio::test]
async fn disable_writes_the_override_and_resume_restores_compilation() {
    let cp = control_plane().await;
    cp.compile.execute().await.unwrap();

    cp.blocking.disable(None).await.unwrap();
    let combined = std::fs::read_to_string(
        cp.shared_dir.path().join("rpz").join("blocklist-combined.rpz"),
    )
    .unwrap();
    assert_eq!(combined.matches("SOA").count(), 1);
    assert_eq!(combined.matches(" NS ").count(), 1);
    assert_eq!(combined.matches("CNAME").count(), 0);

    // Pause that ended in the past flips back on the next resume tick.
    cp.settings
        .set_blocking_state(&BlockingState::PausedUntil(Utc::now() - Duration::seconds(5)))
        .await
        .unwrap();
    assert!(cp.blocking.resume_if_expired().await.unwrap());
    assert!(cp.recompile.take());

    let status = cp.blocking.status().await.unwrap();
    assert_eq!(status.state, "enabled");
    assert!(status.active);
}

#[tokio::test]
async fn ingest_feeds_rollups_and_ptr_naming() {
    let cp = control_plane().await;

    let node = cp
        .nodes
        .create(Node::new("edge-1".to_string(), "edge-key".to_string()))
        .await
        .unwrap();
    let node_id = node.id.unwrap();

    cp.rules
        .create(ClientResolverRule {
            id: None,
            subnet: "10.0.0.0/8".to_string(),
            nameserver: "10.0.0.53:53".to_string(),
            priority: 1,
            enabled: true,
        })
        .await
        .unwrap();

    let received = cp
        .ingest
        .execute(
            node_id,
            vec![
                incoming("E1", "10.0.0.1", "A.Example.COM."),
                incoming("E2", "10.0.0.1", "b.example.com"),
                incoming("E3", "10.0.0.2", "a.example.com"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(received, 3);

    // Stored qnames are normalized.
    let qnames: Vec<(String,)> =
        sqlx::query_as("SELECT DISTINCT qname FROM dns_query_events ORDER BY qname")
            .fetch_all(&cp.pool)
            .await
            .unwrap();
    assert_eq!(qnames[0].0, "a.example.com");

    // PTR resolution through the stub names the client.
    let hostname = cp.ptr.resolve_one("10.0.0.1").await.unwrap();
    assert_eq!(hostname.as_deref(), Some("host-10-0-0-1"));
    let client = cp.clients.get_by_ip("10.0.0.1").await.unwrap().unwrap();
    assert_eq!(client.rdns_name.as_deref(), Some("host-10-0-0-1"));

    // The current hour (still open, but the window query does not care)
    // rolls up to the same totals.
    use chrono::Timelike;
    let hour = Utc::now()
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap();
    let cells = cp.rollup.run_hourly(hour).await.unwrap();
    assert_eq!(cells, 2);

    let total: i64 = sqlx::query_scalar(
        "SELECT SUM(total_queries) FROM query_rollups WHERE granularity = 'hourly'",
    )
    .fetch_one(&cp.pool)
    .await
    .unwrap();
    assert_eq!(total, 3);
}

#[tokio::test]
async fn precache_warms_top_domains_once_until_ttl_decay() {
    let cp = control_plane().await;
    cp.settings.set("precache_enabled", "true").await.unwrap();

    let node = cp
        .nodes
        .create(Node::new("edge-1".to_string(), "edge-key".to_string()))
        .await
        .unwrap();
    cp.ingest
        .execute(
            node.id.unwrap(),
            vec![
                incoming("E1", "10.0.0.1", "hot.example.com"),
                incoming("E2", "10.0.0.2", "hot.example.com"),
                incoming("E3", "10.0.0.1", "warm.example.com"),
            ],
        )
        .await
        .unwrap();

    let first = cp.precache.execute().await.unwrap();
    assert_eq!(first.success, 2);
    assert_eq!(first.failed, 0);

    // Everything has a fresh 300 s TTL; the next pass skips it all.
    let second = cp.precache.execute().await.unwrap();
    assert_eq!(second.success, 0);
    assert_eq!(second.skipped_fresh, 2);
}
