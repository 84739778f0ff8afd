#![allow(dead_code)]

//! Test server wiring: the real router over in-memory SQLite and a
//! temporary shared directory.

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use powerblockade_api::{create_routes, AppState, VersionInfo, NODE_KEY_HEADER};
use powerblockade_application::ports::*;
use powerblockade_application::services::{AuditLog, RecompileFlag, SettingsService};
use powerblockade_application::use_cases::*;
use powerblockade_domain::{Node, NodeStatus};
use powerblockade_infrastructure::database::create_test_pool;
use powerblockade_infrastructure::dns::UdpDnsClient;
use powerblockade_infrastructure::http::HttpBlocklistFetcher;
use powerblockade_infrastructure::package::{RingKeyGenerator, ZipPackageBuilder};
use powerblockade_infrastructure::repositories::*;
use powerblockade_infrastructure::FsPolicyStore;
use std::sync::Arc;
use tower::ServiceExt;

pub const NODE_KEY: &str = "test-node-key-0000000000000000000000000000000000000000000000000000";

pub struct TestServer {
    pub router: Router,
    pub compile: Arc<CompilePolicyUseCase>,
    pub nodes: Arc<dyn NodeRepository>,
    pub blocklists: Arc<dyn BlocklistRepository>,
    pub forward_zones: Arc<dyn ForwardZoneRepository>,
    pub settings: Arc<SettingsService>,
    pub node_id: i64,
    _shared_dir: tempfile::TempDir,
}

pub async fn test_server() -> TestServer {
    let pool = create_test_pool().await.expect("test pool");
    let shared_dir = tempfile::tempdir().expect("tempdir");

    let nodes: Arc<dyn NodeRepository> = Arc::new(SqliteNodeRepository::new(pool.clone()));
    let clients: Arc<dyn ClientRepository> = Arc::new(SqliteClientRepository::new(pool.clone()));
    let blocklists: Arc<dyn BlocklistRepository> =
        Arc::new(SqliteBlocklistRepository::new(pool.clone()));
    let manual: Arc<dyn ManualEntryRepository> =
        Arc::new(SqliteManualEntryRepository::new(pool.clone()));
    let forward_zones: Arc<dyn ForwardZoneRepository> =
        Arc::new(SqliteForwardZoneRepository::new(pool.clone()));
    let events: Arc<dyn EventRepository> = Arc::new(SqliteEventRepository::new(pool.clone()));
    let rollups: Arc<dyn RollupRepository> = Arc::new(SqliteRollupRepository::new(pool.clone()));
    let rules: Arc<dyn ResolverRuleRepository> =
        Arc::new(SqliteResolverRuleRepository::new(pool.clone()));
    let node_metrics: Arc<dyn NodeMetricsRepository> =
        Arc::new(SqliteNodeMetricsRepository::new(pool.clone()));
    let commands: Arc<dyn NodeCommandRepository> =
        Arc::new(SqliteNodeCommandRepository::new(pool.clone()));
    let changes: Arc<dyn ConfigChangeRepository> =
        Arc::new(SqliteConfigChangeRepository::new(pool.clone()));
    let settings = Arc::new(SettingsService::new(Arc::new(SqliteSettingsRepository::new(
        pool.clone(),
    ))));

    let audit = Arc::new(AuditLog::new(changes.clone()));
    let recompile = Arc::new(RecompileFlag::new());
    let store: Arc<dyn PolicyStore> = Arc::new(FsPolicyStore::new(shared_dir.path()));
    let dns: Arc<dyn DnsClient> = Arc::new(UdpDnsClient::new());

    let compile = Arc::new(CompilePolicyUseCase::new(
        blocklists.clone(),
        manual.clone(),
        forward_zones.clone(),
        settings.clone(),
        store.clone(),
    ));
    let blocking = Arc::new(ManageBlockingUseCase::new(
        settings.clone(),
        store.clone(),
        audit.clone(),
        recompile.clone(),
    ));
    let clear_cache = Arc::new(ClearCacheUseCase::new(
        None,
        nodes.clone(),
        commands.clone(),
        audit.clone(),
    ));
    let ptr = Arc::new(PtrResolutionService::new(clients, rules, dns));
    let ingest = Arc::new(IngestEventsUseCase::new(
        events.clone(),
        settings.clone(),
        ptr,
    ));
    let node_sync = Arc::new(NodeSyncUseCase::new(
        nodes.clone(),
        forward_zones.clone(),
        blocklists.clone(),
        commands,
        store,
        settings.clone(),
    ));
    let manage_nodes = Arc::new(ManageNodesUseCase::new(nodes.clone(), audit.clone()));
    let package = Arc::new(GenerateSecondaryPackageUseCase::new(
        nodes.clone(),
        Arc::new(RingKeyGenerator::new()),
        Arc::new(ZipPackageBuilder::new()),
    ));
    let record_metrics = Arc::new(RecordNodeMetricsUseCase::new(node_metrics.clone(), nodes.clone()));
    let exporter = Arc::new(RenderPrometheusUseCase::new(
        events,
        node_metrics,
        settings.clone(),
    ));
    let rollback = Arc::new(RollbackChangeUseCase::new(
        changes,
        blocklists.clone(),
        forward_zones.clone(),
        audit,
    ));
    let search = Arc::new(SearchDomainUseCase::new(blocklists.clone(), manual));
    let refresh = Arc::new(RefreshBlocklistsUseCase::new(
        blocklists.clone(),
        Arc::new(HttpBlocklistFetcher::new().expect("fetcher")),
        compile.clone(),
    ));
    let dashboard = Arc::new(DashboardStatsUseCase::new(rollups));
    let precache = Arc::new(PrecacheWarmUseCase::new(
        Arc::new(SqliteEventRepository::new(pool.clone())),
        settings.clone(),
        Arc::new(UdpDnsClient::new()),
        "127.0.0.1:53".to_string(),
    ));

    // One pre-registered secondary the tests authenticate as.
    let mut seeded = Node::new("edge-1".to_string(), NODE_KEY.to_string());
    seeded.status = NodeStatus::Active;
    let node_id = nodes.create(seeded).await.expect("seed node").id.unwrap();

    let state = AppState {
        nodes: nodes.clone(),
        node_sync,
        ingest,
        record_metrics,
        blocking,
        clear_cache,
        exporter,
        package,
        manage_nodes,
        rollback,
        search,
        refresh,
        dashboard,
        precache,
        version: VersionInfo::default(),
    };

    TestServer {
        router: create_routes(state),
        compile,
        nodes,
        blocklists,
        forward_zones,
        settings,
        node_id,
        _shared_dir: shared_dir,
    }
}

impl TestServer {
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        key: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(key) = key {
            builder = builder.header(NODE_KEY_HEADER, key);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, path: &str, key: Option<&str>) -> Response<Body> {
        self.request(Method::GET, path, key, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        key: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.request(Method::POST, path, key, Some(body)).await
    }
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn text_body(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
