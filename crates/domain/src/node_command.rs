use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pull-based command queue entry. `node_id = None` addresses every node.
/// A command is pending until the node posts a result (`executed_at` set).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCommand {
    pub id: Option<i64>,
    pub node_id: Option<i64>,
    pub command: String,
    pub params: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
    pub result: Option<serde_json::Value>,
}

pub const COMMAND_CLEAR_CACHE: &str = "clear_cache";

impl NodeCommand {
    pub fn clear_cache(node_id: i64) -> Self {
        Self {
            id: None,
            node_id: Some(node_id),
            command: COMMAND_CLEAR_CACHE.to_string(),
            params: None,
            created_at: None,
            executed_at: None,
            result: None,
        }
    }
}
