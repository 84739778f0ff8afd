use powerblockade_application::ports::NodeRepository;
use powerblockade_application::use_cases::{
    ClearCacheUseCase, DashboardStatsUseCase, GenerateSecondaryPackageUseCase,
    IngestEventsUseCase, ManageBlockingUseCase, ManageNodesUseCase, NodeSyncUseCase,
    PrecacheWarmUseCase, RecordNodeMetricsUseCase, RefreshBlocklistsUseCase,
    RenderPrometheusUseCase, RollbackChangeUseCase, SearchDomainUseCase,
};
use std::sync::Arc;

/// Build/version identity reported by `/api/version`.
#[derive(Clone)]
pub struct VersionInfo {
    pub version: &'static str,
    pub protocol_version: u32,
    pub protocol_min_supported: u32,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            protocol_version: 1,
            protocol_min_supported: 1,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub nodes: Arc<dyn NodeRepository>,
    pub node_sync: Arc<NodeSyncUseCase>,
    pub ingest: Arc<IngestEventsUseCase>,
    pub record_metrics: Arc<RecordNodeMetricsUseCase>,
    pub blocking: Arc<ManageBlockingUseCase>,
    pub clear_cache: Arc<ClearCacheUseCase>,
    pub exporter: Arc<RenderPrometheusUseCase>,
    pub package: Arc<GenerateSecondaryPackageUseCase>,
    pub manage_nodes: Arc<ManageNodesUseCase>,
    pub rollback: Arc<RollbackChangeUseCase>,
    pub search: Arc<SearchDomainUseCase>,
    pub refresh: Arc<RefreshBlocklistsUseCase>,
    pub dashboard: Arc<DashboardStatsUseCase>,
    pub precache: Arc<PrecacheWarmUseCase>,
    pub version: VersionInfo,
}
