use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

/// The full core router: node-sync protocol, blocking controls, node
/// lifecycle, audit rollback, and the unauthenticated health/metrics pair.
///
/// Operator routes rely on the external session layer being mounted in
/// front of this router in deployment.
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::system::health_check))
        .route("/metrics", get(handlers::system::metrics))
        .route("/api/version", get(handlers::system::version))
        // Node sync protocol
        .route("/api/node-sync/register", post(handlers::node_sync::register))
        .route("/api/node-sync/heartbeat", post(handlers::node_sync::heartbeat))
        .route("/api/node-sync/config", get(handlers::node_sync::config))
        .route("/api/node-sync/ingest", post(handlers::node_sync::ingest))
        .route("/api/node-sync/metrics", post(handlers::node_sync::push_metrics))
        .route("/api/node-sync/commands", get(handlers::node_sync::poll_commands))
        .route(
            "/api/node-sync/commands/result",
            post(handlers::node_sync::command_result),
        )
        // Blocking state machine
        .route("/api/blocking/status", get(handlers::blocking::status))
        .route("/api/blocking/enable", post(handlers::blocking::enable))
        .route("/api/blocking/disable", post(handlers::blocking::disable))
        .route("/api/blocking/pause", post(handlers::blocking::pause))
        .route("/api/blocking/clear-cache", post(handlers::blocking::clear_cache))
        // Node lifecycle
        .route("/api/nodes", get(handlers::nodes::list_nodes))
        .route("/api/nodes/generate", post(handlers::nodes::generate_package))
        .route("/api/nodes/{node_id}/force-sync", post(handlers::nodes::force_sync))
        .route("/api/nodes/{node_id}/clear-error", post(handlers::nodes::clear_error))
        .route("/api/nodes/{node_id}", delete(handlers::nodes::delete_node))
        // Policy operations, analytics, audit
        .route(
            "/api/blocklists/{blocklist_id}/refresh",
            post(handlers::system::refresh_blocklist),
        )
        .route("/api/policy/search", get(handlers::system::search_domain))
        .route("/api/analytics/summary", get(handlers::system::analytics_summary))
        .route("/api/precache/stats", get(handlers::system::precache_stats))
        .route(
            "/api/audit/{change_id}/rollback",
            post(handlers::system::rollback_change),
        )
        .with_state(state)
}
