use crate::ports::{EventRepository, NodeMetricsRepository};
use crate::services::SettingsService;
use chrono::{Duration, Utc};
use powerblockade_domain::DomainError;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::instrument;

/// Renders the plain-text Prometheus exposition: 24 h event aggregates
/// plus the latest resolver snapshot per node.
pub struct RenderPrometheusUseCase {
    events: Arc<dyn EventRepository>,
    node_metrics: Arc<dyn NodeMetricsRepository>,
    settings: Arc<SettingsService>,
}

impl RenderPrometheusUseCase {
    pub fn new(
        events: Arc<dyn EventRepository>,
        node_metrics: Arc<dyn NodeMetricsRepository>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            events,
            node_metrics,
            settings,
        }
    }

    #[instrument(skip(self), name = "render_metrics")]
    pub async fn execute(&self) -> Result<String, DomainError> {
        let now = Utc::now();
        let threshold = self.settings.cache_hit_threshold_ms().await?;
        let stats = self
            .events
            .window_stats(now - Duration::hours(24), threshold)
            .await?;

        let hit_rate = if stats.total > 0 {
            stats.cache_hits as f64 / stats.total as f64 * 100.0
        } else {
            0.0
        };
        let block_rate = if stats.total > 0 {
            stats.blocked as f64 / stats.total as f64 * 100.0
        } else {
            0.0
        };
        let qps = stats.total as f64 / 86_400.0;
        let time_saved_ms = if stats.cache_hits > 0 {
            (stats.avg_latency_miss_ms - stats.avg_latency_hit_ms) * stats.cache_hits as f64
        } else {
            0.0
        };

        let mut out = String::with_capacity(2048);
        out.push_str("# Prometheus metrics for PowerBlockade\n\n");
        let _ = writeln!(out, "powerblockade_queries_total {}", stats.total);
        let _ = writeln!(out, "powerblockade_blocked_total {}", stats.blocked);
        let _ = writeln!(out, "powerblockade_block_rate {block_rate}");
        let _ = writeln!(out, "powerblockade_cache_hits_total {}", stats.cache_hits);
        let _ = writeln!(out, "powerblockade_cache_hit_rate {hit_rate}");
        let _ = writeln!(
            out,
            "powerblockade_time_saved_seconds {}",
            (time_saved_ms / 1000.0) as i64
        );
        let _ = writeln!(out, "powerblockade_qps {qps:.2}");

        for (node_name, m) in self.node_metrics.latest_per_node().await? {
            let label = format!("{{node=\"{node_name}\"}}");
            let _ = writeln!(out, "powerblockade_node_cache_hits{label} {}", m.cache_hits);
            let _ = writeln!(out, "powerblockade_node_cache_misses{label} {}", m.cache_misses);
            let _ = writeln!(out, "powerblockade_node_cache_entries{label} {}", m.cache_entries);
            let _ = writeln!(
                out,
                "powerblockade_node_concurrent_queries{label} {}",
                m.concurrent_queries
            );
            let _ = writeln!(
                out,
                "powerblockade_node_outgoing_timeouts{label} {}",
                m.outgoing_timeouts
            );
            let _ = writeln!(
                out,
                "powerblockade_node_servfail_answers{label} {}",
                m.servfail_answers
            );
            let _ = writeln!(
                out,
                "powerblockade_node_nxdomain_answers{label} {}",
                m.nxdomain_answers
            );
            let _ = writeln!(out, "powerblockade_node_questions{label} {}", m.questions);
            let _ = writeln!(
                out,
                "powerblockade_node_uptime_seconds{label} {}",
                m.uptime_seconds
            );
        }

        Ok(out)
    }
}
