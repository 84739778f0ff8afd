#![allow(dead_code)]

//! Shared wiring for flow tests: the full use-case graph over in-memory
//! SQLite and a temporary shared directory.

use async_trait::async_trait;
use powerblockade_application::ports::*;
use powerblockade_application::services::{AuditLog, RecompileFlag, SettingsService};
use powerblockade_application::use_cases::*;
use powerblockade_domain::DomainError;
use powerblockade_infrastructure::database::create_test_pool;
use powerblockade_infrastructure::repositories::*;
use powerblockade_infrastructure::FsPolicyStore;
use sqlx::SqlitePool;
use std::net::IpAddr;
use std::sync::Arc;

/// DNS stub: every PTR resolves to a fixed name, every warm returns a TTL.
pub struct StubDnsClient;

#[async_trait]
impl DnsClient for StubDnsClient {
    async fn lookup_ptr(
        &self,
        ip: IpAddr,
        _nameserver: &str,
    ) -> Result<Option<String>, DomainError> {
        Ok(Some(format!("host-{}", ip.to_string().replace(['.', ':'], "-"))))
    }

    async fn warm_a(&self, _domain: &str, _resolver: &str) -> Result<Option<u32>, DomainError> {
        Ok(Some(300))
    }
}

pub struct ControlPlane {
    pub pool: SqlitePool,
    pub nodes: Arc<dyn NodeRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub blocklists: Arc<dyn BlocklistRepository>,
    pub manual: Arc<dyn ManualEntryRepository>,
    pub forward_zones: Arc<dyn ForwardZoneRepository>,
    pub events: Arc<dyn EventRepository>,
    pub rules: Arc<dyn ResolverRuleRepository>,
    pub settings: Arc<SettingsService>,
    pub recompile: Arc<RecompileFlag>,
    pub compile: Arc<CompilePolicyUseCase>,
    pub blocking: Arc<ManageBlockingUseCase>,
    pub ingest: Arc<IngestEventsUseCase>,
    pub ptr: Arc<PtrResolutionService>,
    pub node_sync: Arc<NodeSyncUseCase>,
    pub rollup: Arc<RollupUseCase>,
    pub retention: Arc<RetentionUseCase>,
    pub precache: Arc<PrecacheWarmUseCase>,
    pub shared_dir: tempfile::TempDir,
}

pub async fn control_plane() -> ControlPlane {
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
    let rules: Arc<dyn ResolverRuleRepository> =
        Arc::new(SqliteResolverRuleRepository::new(pool.clone()));
    let rollups: Arc<dyn RollupRepository> = Arc::new(SqliteRollupRepository::new(pool.clone()));
    let node_metrics: Arc<dyn NodeMetricsRepository> =
        Arc::new(SqliteNodeMetricsRepository::new(pool.clone()));
    let commands: Arc<dyn NodeCommandRepository> =
        Arc::new(SqliteNodeCommandRepository::new(pool.clone()));
    let changes: Arc<dyn ConfigChangeRepository> =
        Arc::new(SqliteConfigChangeRepository::new(pool.clone()));
    let settings = Arc::new(SettingsService::new(Arc::new(SqliteSettingsRepository::new(
        pool.clone(),
    ))));

    let audit = Arc::new(AuditLog::new(changes));
    let recompile = Arc::new(RecompileFlag::new());
    let store: Arc<dyn PolicyStore> = Arc::new(FsPolicyStore::new(shared_dir.path()));
    let dns: Arc<dyn DnsClient> = Arc::new(StubDnsClient);

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
        audit,
        recompile.clone(),
    ));
    let ptr = Arc::new(PtrResolutionService::new(
        clients.clone(),
        rules.clone(),
        dns.clone(),
    ));
    let ingest = Arc::new(IngestEventsUseCase::new(
        events.clone(),
        settings.clone(),
        ptr.clone(),
    ));
    let node_sync = Arc::new(NodeSyncUseCase::new(
        nodes.clone(),
        forward_zones.clone(),
        blocklists.clone(),
        commands,
        store,
        settings.clone(),
    ));
    let rollup = Arc::new(RollupUseCase::new(
        events.clone(),
        rollups.clone(),
        settings.clone(),
    ));
    let retention = Arc::new(RetentionUseCase::new(
        events.clone(),
        rollups,
        node_metrics,
        settings.clone(),
    ));
    let precache = Arc::new(PrecacheWarmUseCase::new(
        events.clone(),
        settings.clone(),
        dns,
        "127.0.0.1:53".to_string(),
    ));

    ControlPlane {
        pool,
        nodes,
        clients,
        blocklists,
        manual,
        forward_zones,
        events,
        rules,
        settings,
        recompile,
        compile,
        blocking,
        ingest,
        ptr,
        node_sync,
        rollup,
        retention,
        precache,
        shared_dir,
    }
}
