use crate::ports::{BlocklistRepository, ConfigChangeRepository, ForwardZoneRepository};
use crate::services::AuditLog;
use crate::use_cases::audit::snapshots::{blocklist_snapshot, forward_zone_snapshot};
use powerblockade_domain::{Blocklist, ConfigChange, DomainError, ForwardZone};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct RollbackOutcome {
    pub action: String,
    pub entity_type: String,
}

/// Reverts a recorded policy change.
///
/// Supported for blocklists and forward zones only: a recorded delete is
/// re-inserted from its before snapshot, a create is deleted, and the
/// update family is overwritten from the before snapshot. Each rollback is
/// itself audited with a comment naming the original change.
pub struct RollbackChangeUseCase {
    changes: Arc<dyn ConfigChangeRepository>,
    blocklists: Arc<dyn BlocklistRepository>,
    forward_zones: Arc<dyn ForwardZoneRepository>,
    audit: Arc<AuditLog>,
}

impl RollbackChangeUseCase {
    pub fn new(
        changes: Arc<dyn ConfigChangeRepository>,
        blocklists: Arc<dyn BlocklistRepository>,
        forward_zones: Arc<dyn ForwardZoneRepository>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            changes,
            blocklists,
            forward_zones,
            audit,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        change_id: i64,
        actor_user_id: Option<i64>,
    ) -> Result<RollbackOutcome, DomainError> {
        let change = self
            .changes
            .get_by_id(change_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("config change {change_id}")))?;

        let outcome = match change.entity_type.as_str() {
            "blocklist" => self.rollback_blocklist(&change, actor_user_id).await?,
            "forward_zone" => self.rollback_forward_zone(&change, actor_user_id).await?,
            other => {
                return Err(DomainError::Validation(format!(
                    "Rollback is not supported for entity type '{other}'"
                )))
            }
        };

        info!(
            change_id,
            action = %outcome.action,
            entity_type = %outcome.entity_type,
            "Change rolled back"
        );
        Ok(outcome)
    }

    async fn rollback_blocklist(
        &self,
        change: &ConfigChange,
        actor_user_id: Option<i64>,
    ) -> Result<RollbackOutcome, DomainError> {
        match change.action.as_str() {
            "delete" => {
                let before: Blocklist = deserialize_before(change)?;
                if self.blocklists.get_by_url(&before.url).await?.is_some() {
                    return Err(DomainError::Conflict(format!(
                        "Blocklist URL '{}' already exists",
                        before.url
                    )));
                }
                let restored = self.blocklists.create(before).await?;
                self.record(
                    change,
                    "blocklist",
                    restored.id,
                    "rollback_restore",
                    actor_user_id,
                    None,
                    Some(blocklist_snapshot(&restored)),
                )
                .await?;
                Ok(outcome("rollback_restore", "blocklist"))
            }
            "create" => {
                let entity_id = require_entity_id(change)?;
                if let Some(current) = self.blocklists.get_by_id(entity_id).await? {
                    self.blocklists.delete(entity_id).await?;
                    self.record(
                        change,
                        "blocklist",
                        Some(entity_id),
                        "rollback_delete",
                        actor_user_id,
                        Some(blocklist_snapshot(&current)),
                        None,
                    )
                    .await?;
                }
                Ok(outcome("rollback_delete", "blocklist"))
            }
            "update" | "toggle" | "update_frequency" | "update_schedule" => {
                let entity_id = require_entity_id(change)?;
                let mut before: Blocklist = deserialize_before(change)?;
                let current = self
                    .blocklists
                    .get_by_id(entity_id)
                    .await?
                    .ok_or_else(|| {
                        DomainError::Conflict(format!("Blocklist {entity_id} no longer exists"))
                    })?;
                before.id = current.id;
                self.blocklists.update(&before).await?;
                self.record(
                    change,
                    "blocklist",
                    Some(entity_id),
                    "rollback_update",
                    actor_user_id,
                    Some(blocklist_snapshot(&current)),
                    Some(blocklist_snapshot(&before)),
                )
                .await?;
                Ok(outcome("rollback_update", "blocklist"))
            }
            other => Err(DomainError::Validation(format!(
                "Rollback is not supported for action '{other}'"
            ))),
        }
    }

    async fn rollback_forward_zone(
        &self,
        change: &ConfigChange,
        actor_user_id: Option<i64>,
    ) -> Result<RollbackOutcome, DomainError> {
        match change.action.as_str() {
            "delete" => {
                let before: ForwardZone = deserialize_before(change)?;
                let restored = self.forward_zones.create(before).await?;
                self.record(
                    change,
                    "forward_zone",
                    restored.id,
                    "rollback_restore",
                    actor_user_id,
                    None,
                    Some(forward_zone_snapshot(&restored)),
                )
                .await?;
                Ok(outcome("rollback_restore", "forward_zone"))
            }
            "create" => {
                let entity_id = require_entity_id(change)?;
                if let Some(current) = self.forward_zones.get_by_id(entity_id).await? {
                    self.forward_zones.delete(entity_id).await?;
                    self.record(
                        change,
                        "forward_zone",
                        Some(entity_id),
                        "rollback_delete",
                        actor_user_id,
                        Some(forward_zone_snapshot(&current)),
                        None,
                    )
                    .await?;
                }
                Ok(outcome("rollback_delete", "forward_zone"))
            }
            "update" | "toggle" => {
                let entity_id = require_entity_id(change)?;
                let mut before: ForwardZone = deserialize_before(change)?;
                let current = self
                    .forward_zones
                    .get_by_id(entity_id)
                    .await?
                    .ok_or_else(|| {
                        DomainError::Conflict(format!("Forward zone {entity_id} no longer exists"))
                    })?;
                before.id = current.id;
                self.forward_zones.update(&before).await?;
                self.record(
                    change,
                    "forward_zone",
                    Some(entity_id),
                    "rollback_update",
                    actor_user_id,
                    Some(forward_zone_snapshot(&current)),
                    Some(forward_zone_snapshot(&before)),
                )
                .await?;
                Ok(outcome("rollback_update", "forward_zone"))
            }
            other => Err(DomainError::Validation(format!(
                "Rollback is not supported for action '{other}'"
            ))),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        original: &ConfigChange,
        entity_type: &str,
        entity_id: Option<i64>,
        action: &str,
        actor_user_id: Option<i64>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Result<(), DomainError> {
        let mut change = ConfigChange::new(entity_type, entity_id, action)
            .with_actor(actor_user_id)
            .with_comment(format!(
                "rollback of change {}",
                original.id.unwrap_or_default()
            ));
        change.before_data = before;
        change.after_data = after;
        self.audit.record(change).await
    }
}

fn outcome(action: &str, entity_type: &str) -> RollbackOutcome {
    RollbackOutcome {
        action: action.to_string(),
        entity_type: entity_type.to_string(),
    }
}

fn require_entity_id(change: &ConfigChange) -> Result<i64, DomainError> {
    change
        .entity_id
        .ok_or_else(|| DomainError::Validation("Change has no entity id".to_string()))
}

fn deserialize_before<T: serde::de::DeserializeOwned>(
    change: &ConfigChange,
) -> Result<T, DomainError> {
    let data = change
        .before_data
        .clone()
        .ok_or_else(|| DomainError::Validation("Change has no before snapshot".to_string()))?;
    serde_json::from_value(data)
        .map_err(|e| DomainError::Validation(format!("Unreadable before snapshot: {e}")))
}
