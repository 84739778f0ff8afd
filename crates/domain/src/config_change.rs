use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit-trail row: before/after JSON snapshots of a policy mutation.
/// Snapshots are produced by explicit per-entity functions, never by
/// walking object graphs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigChange {
    pub id: Option<i64>,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub action: String,
    pub actor_user_id: Option<i64>,
    pub before_data: Option<serde_json::Value>,
    pub after_data: Option<serde_json::Value>,
    pub comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ConfigChange {
    pub fn new(entity_type: &str, entity_id: Option<i64>, action: &str) -> Self {
        Self {
            id: None,
            entity_type: entity_type.to_string(),
            entity_id,
            action: action.to_string(),
            actor_user_id: None,
            before_data: None,
            after_data: None,
            comment: None,
            created_at: None,
        }
    }

    pub fn with_before(mut self, before: serde_json::Value) -> Self {
        self.before_data = Some(before);
        self
    }

    pub fn with_after(mut self, after: serde_json::Value) -> Self {
        self.after_data = Some(after);
        self
    }

    pub fn with_actor(mut self, user_id: Option<i64>) -> Self {
        self.actor_user_id = user_id;
        self
    }

    pub fn with_comment(mut self, comment: String) -> Self {
        self.comment = Some(comment);
        self
    }
}
