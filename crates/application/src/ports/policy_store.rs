use async_trait::async_trait;
use powerblockade_domain::DomainError;

pub const RPZ_COMBINED_FILENAME: &str = "blocklist-combined.rpz";
pub const RPZ_WHITELIST_FILENAME: &str = "whitelist.rpz";
pub const FORWARD_ZONES_FILENAME: &str = "forward-zones.conf";

#[derive(Debug, Clone)]
pub struct RpzFile {
    pub filename: String,
    pub content: String,
}

/// The shared policy directory the primary materializes compiled output
/// into. Writes must be atomic from a reader's perspective
/// (write-temp-then-rename over the same path).
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn write_rpz(&self, filename: &str, content: &str) -> Result<(), DomainError>;

    async fn write_forward_zones(&self, content: &str) -> Result<(), DomainError>;

    /// Current RPZ files, served verbatim through the node config endpoint.
    async fn read_rpz_files(&self) -> Result<Vec<RpzFile>, DomainError>;
}
