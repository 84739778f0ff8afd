use crate::ports::{NodeCommandRepository, NodeRepository, RecursorClient};
use crate::services::AuditLog;
use powerblockade_domain::{ConfigChange, DomainError, NodeCommand, NodeStatus};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheClearResult {
    pub node: String,
    pub success: bool,
    pub count: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheClearReport {
    pub results: Vec<CacheClearResult>,
    pub commands_queued: u64,
}

/// Flush the primary's recursor cache directly and fan a `clear_cache`
/// command out to every active secondary via the command channel.
pub struct ClearCacheUseCase {
    recursor: Option<Arc<dyn RecursorClient>>,
    nodes: Arc<dyn NodeRepository>,
    commands: Arc<dyn NodeCommandRepository>,
    audit: Arc<AuditLog>,
}

impl ClearCacheUseCase {
    pub fn new(
        recursor: Option<Arc<dyn RecursorClient>>,
        nodes: Arc<dyn NodeRepository>,
        commands: Arc<dyn NodeCommandRepository>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            recursor,
            nodes,
            commands,
            audit,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        actor_user_id: Option<i64>,
    ) -> Result<CacheClearReport, DomainError> {
        let mut results = Vec::new();

        if let Some(recursor) = &self.recursor {
            match recursor.flush_cache().await {
                Ok(count) => results.push(CacheClearResult {
                    node: "primary".to_string(),
                    success: true,
                    count: Some(count),
                    error: None,
                }),
                Err(e) => results.push(CacheClearResult {
                    node: "primary".to_string(),
                    success: false,
                    count: None,
                    error: Some(e.to_string()),
                }),
            }
        }

        let mut queued = 0u64;
        for node in self.nodes.get_all().await? {
            if node.status != NodeStatus::Active || node.is_primary() {
                continue;
            }
            let Some(id) = node.id else { continue };
            self.commands.queue(NodeCommand::clear_cache(id)).await?;
            queued += 1;
        }

        self.audit
            .record(
                ConfigChange::new("settings", Some(0), "cache_clear")
                    .with_actor(actor_user_id)
                    .with_after(json!({ "results": results, "commands_queued": queued })),
            )
            .await?;

        info!(commands_queued = queued, "Cache clear dispatched");
        Ok(CacheClearReport {
            results,
            commands_queued: queued,
        })
    }
}
