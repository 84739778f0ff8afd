pub mod dashboard;
pub mod exporter;
pub mod record;
pub mod scrape_local;

pub use dashboard::DashboardStatsUseCase;
pub use exporter::RenderPrometheusUseCase;
pub use record::RecordNodeMetricsUseCase;
pub use scrape_local::{metrics_from_gauges, ScrapeLocalMetricsUseCase};
