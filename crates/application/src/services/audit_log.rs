use crate::ports::ConfigChangeRepository;
use powerblockade_domain::{ConfigChange, DomainError};
use std::sync::Arc;
use tracing::warn;

/// Append-only audit recorder. Recording is best-effort: a failed audit
/// write logs and returns Ok so it never blocks the mutation it describes.
pub struct AuditLog {
    repo: Arc<dyn ConfigChangeRepository>,
}

impl AuditLog {
    pub fn new(repo: Arc<dyn ConfigChangeRepository>) -> Self {
        Self { repo }
    }

    pub async fn record(&self, change: ConfigChange) -> Result<(), DomainError> {
        if let Err(e) = self.repo.record(change).await {
            warn!(error = %e, "Audit record failed");
        }
        Ok(())
    }
}
