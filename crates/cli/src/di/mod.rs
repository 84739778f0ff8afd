//! Dependency wiring: repositories over the pools, then the use-case graph.

use powerblockade_application::ports::*;
use powerblockade_application::services::{AuditLog, RecompileFlag, SettingsService};
use powerblockade_application::use_cases::*;
use powerblockade_domain::AppConfig;
use powerblockade_infrastructure::dns::UdpDnsClient;
use powerblockade_infrastructure::http::{HttpBlocklistFetcher, HttpRecursorClient};
use powerblockade_infrastructure::package::{RingKeyGenerator, ZipPackageBuilder};
use powerblockade_infrastructure::repositories::*;
use powerblockade_infrastructure::FsPolicyStore;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct Repositories {
    pub nodes: Arc<dyn NodeRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub blocklists: Arc<dyn BlocklistRepository>,
    pub manual_entries: Arc<dyn ManualEntryRepository>,
    pub forward_zones: Arc<dyn ForwardZoneRepository>,
    pub events: Arc<dyn EventRepository>,
    pub events_read: Arc<dyn EventRepository>,
    pub rollups: Arc<dyn RollupRepository>,
    pub node_metrics: Arc<dyn NodeMetricsRepository>,
    pub node_commands: Arc<dyn NodeCommandRepository>,
    pub config_changes: Arc<dyn ConfigChangeRepository>,
    pub resolver_rules: Arc<dyn ResolverRuleRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl Repositories {
    pub fn new(write_pool: SqlitePool, read_pool: SqlitePool) -> Self {
        Self {
            nodes: Arc::new(SqliteNodeRepository::new(write_pool.clone())),
            clients: Arc::new(SqliteClientRepository::new(write_pool.clone())),
            blocklists: Arc::new(SqliteBlocklistRepository::new(write_pool.clone())),
            manual_entries: Arc::new(SqliteManualEntryRepository::new(write_pool.clone())),
            forward_zones: Arc::new(SqliteForwardZoneRepository::new(write_pool.clone())),
            events: Arc::new(SqliteEventRepository::new(write_pool.clone())),
            events_read: Arc::new(SqliteEventRepository::new(read_pool.clone())),
            rollups: Arc::new(SqliteRollupRepository::new(write_pool.clone())),
            node_metrics: Arc::new(SqliteNodeMetricsRepository::new(write_pool.clone())),
            node_commands: Arc::new(SqliteNodeCommandRepository::new(write_pool.clone())),
            config_changes: Arc::new(SqliteConfigChangeRepository::new(write_pool.clone())),
            resolver_rules: Arc::new(SqliteResolverRuleRepository::new(write_pool.clone())),
            settings: Arc::new(SqliteSettingsRepository::new(write_pool)),
        }
    }
}

pub struct UseCases {
    pub settings: Arc<SettingsService>,
    pub audit: Arc<AuditLog>,
    pub recompile: Arc<RecompileFlag>,
    pub compile: Arc<CompilePolicyUseCase>,
    pub refresh: Arc<RefreshBlocklistsUseCase>,
    pub schedule_check: Arc<ScheduleCheckUseCase>,
    pub blocking: Arc<ManageBlockingUseCase>,
    pub clear_cache: Arc<ClearCacheUseCase>,
    pub ingest: Arc<IngestEventsUseCase>,
    pub ptr: Arc<PtrResolutionService>,
    pub rollup: Arc<RollupUseCase>,
    pub retention: Arc<RetentionUseCase>,
    pub precache: Arc<PrecacheWarmUseCase>,
    pub rollback: Arc<RollbackChangeUseCase>,
    pub node_sync: Arc<NodeSyncUseCase>,
    pub manage_nodes: Arc<ManageNodesUseCase>,
    pub package: Arc<GenerateSecondaryPackageUseCase>,
    pub record_metrics: Arc<RecordNodeMetricsUseCase>,
    pub scrape_local: Option<Arc<ScrapeLocalMetricsUseCase>>,
    pub exporter: Arc<RenderPrometheusUseCase>,
    pub search: Arc<SearchDomainUseCase>,
    pub dashboard: Arc<DashboardStatsUseCase>,
}

impl UseCases {
    pub fn new(repos: &Repositories, config: &AppConfig) -> anyhow::Result<Self> {
        let settings = Arc::new(SettingsService::new(repos.settings.clone()));
        let audit = Arc::new(AuditLog::new(repos.config_changes.clone()));
        let recompile = Arc::new(RecompileFlag::new());

        let store: Arc<dyn PolicyStore> = Arc::new(FsPolicyStore::new(config.shared_dir.clone()));
        let dns: Arc<dyn DnsClient> = Arc::new(UdpDnsClient::new());
        let fetcher: Arc<dyn BlocklistFetcher> = Arc::new(HttpBlocklistFetcher::new()?);

        let recursor: Option<Arc<dyn RecursorClient>> = match &config.recursor_api_url {
            Some(url) => Some(Arc::new(HttpRecursorClient::new(
                url,
                config.recursor_api_key.clone(),
            )?)),
            None => None,
        };

        let compile = Arc::new(CompilePolicyUseCase::new(
            repos.blocklists.clone(),
            repos.manual_entries.clone(),
            repos.forward_zones.clone(),
            settings.clone(),
            store.clone(),
        ));
        let refresh = Arc::new(RefreshBlocklistsUseCase::new(
            repos.blocklists.clone(),
            fetcher,
            compile.clone(),
        ));
        let schedule_check = Arc::new(ScheduleCheckUseCase::new(
            repos.blocklists.clone(),
            settings.clone(),
            audit.clone(),
            compile.clone(),
        ));
        let blocking = Arc::new(ManageBlockingUseCase::new(
            settings.clone(),
            store.clone(),
            audit.clone(),
            recompile.clone(),
        ));
        let clear_cache = Arc::new(ClearCacheUseCase::new(
            recursor.clone(),
            repos.nodes.clone(),
            repos.node_commands.clone(),
            audit.clone(),
        ));

        let ptr = Arc::new(PtrResolutionService::new(
            repos.clients.clone(),
            repos.resolver_rules.clone(),
            dns.clone(),
        ));
        let ingest = Arc::new(IngestEventsUseCase::new(
            repos.events.clone(),
            settings.clone(),
            ptr.clone(),
        ));

        let rollup = Arc::new(RollupUseCase::new(
            repos.events.clone(),
            repos.rollups.clone(),
            settings.clone(),
        ));
        let retention = Arc::new(RetentionUseCase::new(
            repos.events.clone(),
            repos.rollups.clone(),
            repos.node_metrics.clone(),
            settings.clone(),
        ));
        let precache = Arc::new(PrecacheWarmUseCase::new(
            repos.events_read.clone(),
            settings.clone(),
            dns,
            config.resolver_addr.clone(),
        ));

        let rollback = Arc::new(RollbackChangeUseCase::new(
            repos.config_changes.clone(),
            repos.blocklists.clone(),
            repos.forward_zones.clone(),
            audit.clone(),
        ));

        let node_sync = Arc::new(NodeSyncUseCase::new(
            repos.nodes.clone(),
            repos.forward_zones.clone(),
            repos.blocklists.clone(),
            repos.node_commands.clone(),
            store,
            settings.clone(),
        ));
        let manage_nodes = Arc::new(ManageNodesUseCase::new(
            repos.nodes.clone(),
            audit.clone(),
        ));
        let package = Arc::new(GenerateSecondaryPackageUseCase::new(
            repos.nodes.clone(),
            Arc::new(RingKeyGenerator::new()),
            Arc::new(ZipPackageBuilder::new()),
        ));

        let record_metrics = Arc::new(RecordNodeMetricsUseCase::new(
            repos.node_metrics.clone(),
            repos.nodes.clone(),
        ));
        let scrape_local = recursor.map(|client| {
            Arc::new(ScrapeLocalMetricsUseCase::new(
                client,
                repos.node_metrics.clone(),
                repos.nodes.clone(),
            ))
        });
        let exporter = Arc::new(RenderPrometheusUseCase::new(
            repos.events_read.clone(),
            repos.node_metrics.clone(),
            settings.clone(),
        ));
        let search = Arc::new(SearchDomainUseCase::new(
            repos.blocklists.clone(),
            repos.manual_entries.clone(),
        ));
        let dashboard = Arc::new(DashboardStatsUseCase::new(repos.rollups.clone()));

        Ok(Self {
            settings,
            audit,
            recompile,
            compile,
            refresh,
            schedule_check,
            blocking,
            clear_cache,
            ingest,
            ptr,
            rollup,
            retention,
            precache,
            rollback,
            node_sync,
            manage_nodes,
            package,
            record_metrics,
            scrape_local,
            exporter,
            search,
            dashboard,
        })
    }
}
