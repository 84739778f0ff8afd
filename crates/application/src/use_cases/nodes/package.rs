use crate::ports::{KeyGenerator, NodeRepository, PackageBuilder};
use powerblockade_domain::{DomainError, Node};
use std::sync::Arc;
use tracing::{info, instrument};

/// Builds the downloadable deployment bundle for a secondary.
///
/// Idempotent on node name: a known node keeps its API key, an unknown
/// name gets a fresh row with a newly generated key.
pub struct GenerateSecondaryPackageUseCase {
    nodes: Arc<dyn NodeRepository>,
    keygen: Arc<dyn KeyGenerator>,
    builder: Arc<dyn PackageBuilder>,
}

impl GenerateSecondaryPackageUseCase {
    pub fn new(
        nodes: Arc<dyn NodeRepository>,
        keygen: Arc<dyn KeyGenerator>,
        builder: Arc<dyn PackageBuilder>,
    ) -> Self {
        Self {
            nodes,
            keygen,
            builder,
        }
    }

    /// Returns the zip payload and its suggested filename.
    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        name: &str,
        primary_url: &str,
    ) -> Result<(Vec<u8>, String), DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("Node name cannot be empty".to_string()));
        }

        let node = match self.nodes.get_by_name(name).await? {
            Some(existing) => existing,
            None => {
                let node = Node::new(name.to_string(), self.keygen.generate());
                self.nodes.create(node).await?
            }
        };

        let payload = self
            .builder
            .build(&node.name, primary_url.trim_end_matches('/'), &node.api_key)
            .await?;

        info!(node = %node.name, bytes = payload.len(), "Secondary package generated");
        let filename = format!("powerblockade-secondary-{}.zip", node.name);
        Ok((payload, filename))
    }
}
