use crate::ports::{
    BlocklistRepository, ForwardZoneRepository, NodeCommandRepository, NodeRepository, PolicyStore,
};
use crate::services::SettingsService;
use chrono::Utc;
use powerblockade_domain::{policy, settings, DomainError, NodeCommand};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Node-side view of one RPZ file in the config bundle.
#[derive(Debug, Clone, Serialize)]
pub struct RpzFileView {
    pub filename: String,
    pub content: String,
    pub checksum: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForwardZoneView {
    pub domain: String,
    pub servers: String,
    pub is_override: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlocklistSummary {
    pub name: String,
    pub list_type: String,
    pub enabled: bool,
    pub entry_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeConfigBundle {
    pub config_version: String,
    pub rpz_files: Vec<RpzFileView>,
    pub forward_zones: Vec<ForwardZoneView>,
    pub settings: HashMap<String, String>,
    pub blocklists: Vec<BlocklistSummary>,
}

/// The sync protocol's server side: register, heartbeat, config bundle,
/// command channel. Callers are already authenticated; every method takes
/// the authenticated node's id.
pub struct NodeSyncUseCase {
    nodes: Arc<dyn NodeRepository>,
    forward_zones: Arc<dyn ForwardZoneRepository>,
    blocklists: Arc<dyn BlocklistRepository>,
    commands: Arc<dyn NodeCommandRepository>,
    store: Arc<dyn PolicyStore>,
    settings: Arc<SettingsService>,
}

impl NodeSyncUseCase {
    pub fn new(
        nodes: Arc<dyn NodeRepository>,
        forward_zones: Arc<dyn ForwardZoneRepository>,
        blocklists: Arc<dyn BlocklistRepository>,
        commands: Arc<dyn NodeCommandRepository>,
        store: Arc<dyn PolicyStore>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            nodes,
            forward_zones,
            blocklists,
            commands,
            store,
            settings,
        }
    }

    /// Bind the caller's identity to its key and return the current bundle
    /// version.
    #[instrument(skip(self))]
    pub async fn register(
        &self,
        node_id: i64,
        name: &str,
        ip_address: Option<&str>,
        version: Option<&str>,
    ) -> Result<String, DomainError> {
        self.nodes
            .register(node_id, name, ip_address, version, Utc::now())
            .await?;
        info!(node = name, "Node registered");
        self.settings.config_version().await
    }

    /// Liveness plus reported counters; returns the bundle version the
    /// agent diffs against.
    pub async fn heartbeat(
        &self,
        node_id: i64,
        version: Option<&str>,
        queries_total: Option<i64>,
        queries_blocked: Option<i64>,
    ) -> Result<String, DomainError> {
        self.nodes
            .heartbeat(node_id, version, queries_total, queries_blocked, Utc::now())
            .await?;
        self.settings.config_version().await
    }

    /// The full bundle for the calling node: RPZ files with checksums,
    /// its effective forward zones (per-node override wins), operational
    /// settings, and blocklist summaries.
    #[instrument(skip(self))]
    pub async fn config(&self, node_id: i64) -> Result<NodeConfigBundle, DomainError> {
        let rpz_files = self
            .store
            .read_rpz_files()
            .await?
            .into_iter()
            .map(|f| {
                let checksum = policy::checksum16(&f.content);
                RpzFileView {
                    filename: f.filename,
                    content: f.content,
                    checksum,
                }
            })
            .collect();

        // Globals first; a node override replaces the global entry for the
        // same domain.
        let mut by_domain: HashMap<String, ForwardZoneView> = HashMap::new();
        for zone in self.forward_zones.get_for_node(node_id).await? {
            let is_override = zone.node_id.is_some();
            let keep_existing = by_domain
                .get(&zone.domain)
                .is_some_and(|existing| existing.is_override && !is_override);
            if keep_existing {
                continue;
            }
            by_domain.insert(
                zone.domain.clone(),
                ForwardZoneView {
                    domain: zone.domain,
                    servers: zone.servers,
                    is_override,
                },
            );
        }
        let mut forward_zones: Vec<ForwardZoneView> = by_domain.into_values().collect();
        forward_zones.sort_by(|a, b| a.domain.cmp(&b.domain));

        let mut config_settings = HashMap::new();
        for key in [
            settings::RETENTION_EVENTS_DAYS,
            settings::RETENTION_ROLLUPS_DAYS,
            settings::PTR_RESOLUTION_ENABLED,
        ] {
            config_settings.insert(key.to_string(), self.settings.get(key).await?);
        }

        let blocklists = self
            .blocklists
            .get_all()
            .await?
            .into_iter()
            .map(|bl| BlocklistSummary {
                name: bl.name,
                list_type: bl.list_type.as_str().to_string(),
                enabled: bl.enabled,
                entry_count: bl.entry_count,
            })
            .collect();

        Ok(NodeConfigBundle {
            config_version: self.settings.config_version().await?,
            rpz_files,
            forward_zones,
            settings: config_settings,
            blocklists,
        })
    }

    /// Pending commands for this node (or broadcast to all).
    pub async fn poll_commands(&self, node_id: i64) -> Result<Vec<NodeCommand>, DomainError> {
        let commands = self.commands.pending_for_node(node_id).await?;
        debug!(node_id, pending = commands.len(), "Commands polled");
        Ok(commands)
    }

    /// Store a command result reported by the node.
    pub async fn report_command_result(
        &self,
        node_id: i64,
        command_id: i64,
        success: bool,
        result: Option<serde_json::Value>,
    ) -> Result<(), DomainError> {
        let payload = serde_json::json!({ "success": success, "result": result });
        let updated = self
            .commands
            .mark_executed(command_id, payload, Utc::now())
            .await?;
        if !updated {
            return Err(DomainError::NotFound(format!("command {command_id}")));
        }
        self.nodes.touch_last_seen(node_id, Utc::now()).await?;
        Ok(())
    }
}
