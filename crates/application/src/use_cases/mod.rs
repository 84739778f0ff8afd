pub mod audit;
pub mod blocking;
pub mod ingest;
pub mod metrics;
pub mod nodes;
pub mod policy;
pub mod precache;
pub mod retention;
pub mod rollup;
pub mod schedule;

pub use audit::{RollbackChangeUseCase, RollbackOutcome};
pub use blocking::{BlockingStatus, CacheClearReport, ClearCacheUseCase, ManageBlockingUseCase};
pub use ingest::{IncomingEvent, IngestEventsUseCase, PtrResolutionService};
pub use metrics::{
    DashboardStatsUseCase, RecordNodeMetricsUseCase, RenderPrometheusUseCase,
    ScrapeLocalMetricsUseCase,
};
pub use nodes::{
    GenerateSecondaryPackageUseCase, ManageNodesUseCase, NodeConfigBundle, NodeSyncUseCase,
};
pub use policy::{CompilePolicyUseCase, CompileReport, RefreshBlocklistsUseCase, SearchDomainUseCase};
pub use precache::{PrecacheWarmUseCase, WarmingReport};
pub use retention::{RetentionReport, RetentionUseCase};
pub use rollup::{RollupReport, RollupUseCase};
pub use schedule::{ScheduleCheckUseCase, ScheduleReport};
