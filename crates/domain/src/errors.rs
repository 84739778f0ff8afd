use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Missing node API key")]
    AuthMissing,

    #[error("Invalid node API key")]
    AuthInvalid,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Primary node cannot be deleted")]
    PrimaryNodeProtected,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("DNS lookup timeout")]
    LookupTimeout,

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Insecure configuration: {0}")]
    SecurityRefusal(String),
}

impl DomainError {
    /// True for errors the scheduler should simply retry on the next cadence.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::DatabaseError(_)
                | DomainError::UpstreamFetch(_)
                | DomainError::LookupTimeout
        )
    }
}
