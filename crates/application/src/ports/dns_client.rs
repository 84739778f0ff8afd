use async_trait::async_trait;
use powerblockade_domain::DomainError;
use std::net::IpAddr;

/// Minimal DNS lookups against an explicit server: PTR for client naming,
/// A for cache warming. Both are plain UDP with per-call timeouts.
#[async_trait]
pub trait DnsClient: Send + Sync {
    /// Reverse lookup of `ip` via `nameserver` (`host[:port]`). `Ok(None)`
    /// means the server answered without a PTR record.
    async fn lookup_ptr(
        &self,
        ip: IpAddr,
        nameserver: &str,
    ) -> Result<Option<String>, DomainError>;

    /// A-query for `domain` against `resolver` (`host[:port]`), returning
    /// the answer's minimum TTL when any A record came back.
    async fn warm_a(&self, domain: &str, resolver: &str) -> Result<Option<u32>, DomainError>;
}
