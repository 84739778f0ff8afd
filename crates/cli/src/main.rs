//! # PowerBlockade
//!
//! Control-plane primary for a fleet of filtering DNS resolvers: owns
//! policy, compiles RPZ bundles, serves the node-sync protocol, and runs
//! the background pipeline (refresh, rollups, retention, precache).

mod bootstrap;
mod di;
mod server;

use clap::Parser;
use powerblockade_api::{create_routes, AppState, VersionInfo};
use powerblockade_domain::{policy, AppConfig, PRIMARY_NODE_NAME};
use powerblockade_jobs::{
    BlockingResumeJob, BlocklistRefreshJob, JobRunner, LocalMetricsJob, PrecacheJob, RetentionJob,
    RollupJob, ScheduleCheckJob,
};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "powerblockade")]
#[command(version)]
#[command(about = "Distributed DNS filtering control plane (primary node)")]
struct Cli {
    /// Bind address for the API server (overrides BIND_ADDR)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bootstrap::init_logging();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    bootstrap::enforce_security(&config);

    let (write_pool, read_pool) = bootstrap::init_database(&config.database_url, &config.database)
        .await?;

    let repos = di::Repositories::new(write_pool.clone(), read_pool);
    let use_cases = di::UseCases::new(&repos, &config)?;

    bootstrap_primary_node(&config, &use_cases).await?;

    // Materialize policy once at boot so registering nodes see a bundle
    // version immediately.
    if let Err(e) = use_cases.compile.execute().await {
        warn!(error = %e, "Initial policy compile failed; will retry on schedule");
    }

    let mut runner = JobRunner::new()
        .with_blocklist_refresh(BlocklistRefreshJob::new(use_cases.refresh.clone()))
        .with_schedule_check(ScheduleCheckJob::new(use_cases.schedule_check.clone()))
        .with_rollup(RollupJob::new(use_cases.rollup.clone()))
        .with_retention(RetentionJob::new(use_cases.retention.clone()))
        .with_precache(PrecacheJob::new(use_cases.precache.clone()))
        .with_blocking_resume(BlockingResumeJob::new(
            use_cases.blocking.clone(),
            use_cases.compile.clone(),
            use_cases.recompile.clone(),
        ));
    if let Some(scrape) = &use_cases.scrape_local {
        runner = runner.with_local_metrics(LocalMetricsJob::new(scrape.clone()));
    }
    let jobs = runner.start().await;

    let state = AppState {
        nodes: repos.nodes.clone(),
        node_sync: use_cases.node_sync.clone(),
        ingest: use_cases.ingest.clone(),
        record_metrics: use_cases.record_metrics.clone(),
        blocking: use_cases.blocking.clone(),
        clear_cache: use_cases.clear_cache.clone(),
        exporter: use_cases.exporter.clone(),
        package: use_cases.package.clone(),
        manage_nodes: use_cases.manage_nodes.clone(),
        rollback: use_cases.rollback.clone(),
        search: use_cases.search.clone(),
        refresh: use_cases.refresh.clone(),
        dashboard: use_cases.dashboard.clone(),
        precache: use_cases.precache.clone(),
        version: VersionInfo::default(),
    };
    let router = create_routes(state).layer(TraceLayer::new_for_http());

    let result = server::serve(&config.bind_addr, router).await;
    if let Err(e) = &result {
        error!(error = %e, "Server exited with error");
    }

    jobs.shutdown(SHUTDOWN_GRACE).await;
    write_pool.close().await;
    info!("Shutdown complete");
    result
}

/// Ensure the primary's own node row exists. The API key comes from
/// `PRIMARY_API_KEY` when set, otherwise it is derived from the admin
/// secret so restarts keep a stable key.
async fn bootstrap_primary_node(
    config: &AppConfig,
    use_cases: &di::UseCases,
) -> anyhow::Result<()> {
    let name = config
        .node_name
        .clone()
        .unwrap_or_else(|| PRIMARY_NODE_NAME.to_string());

    let api_key = config.primary_api_key.clone().unwrap_or_else(|| {
        policy::content_hash(&format!("{name}:{}", config.admin_secret_key))
    });

    use_cases
        .manage_nodes
        .bootstrap_primary(&name, &api_key)
        .await?;
    Ok(())
}
