use crate::ports::{ClientRepository, DnsClient, ResolverRuleRepository};
use chrono::Utc;
use powerblockade_domain::{DomainError, RuleMatcher};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Concurrent PTR lookups allowed at once; overflow is dropped, not queued.
const MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Background reverse-DNS naming of clients.
///
/// Lookups go through the priority-ordered resolver rules; results and
/// failures are cached on the client row (1 h / 5 min). The pool is a
/// plain semaphore: when it is full the IP is skipped with a log line and
/// picked up again on a later batch.
pub struct PtrResolutionService {
    clients: Arc<dyn ClientRepository>,
    rules: Arc<dyn ResolverRuleRepository>,
    dns: Arc<dyn DnsClient>,
    permits: Arc<Semaphore>,
}

impl PtrResolutionService {
    pub fn new(
        clients: Arc<dyn ClientRepository>,
        rules: Arc<dyn ResolverRuleRepository>,
        dns: Arc<dyn DnsClient>,
    ) -> Self {
        Self {
            clients,
            rules,
            dns,
            permits: Arc::new(Semaphore::new(MAX_CONCURRENT_LOOKUPS)),
        }
    }

    /// Fire-and-forget resolution of a batch of IPs.
    pub fn spawn_resolve(self: &Arc<Self>, ips: Vec<String>) {
        for ip in ips {
            let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
                debug!(%ip, "PTR pool full, dropping lookup");
                continue;
            };
            let svc = Arc::clone(self);
            tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = svc.resolve_one(&ip).await {
                    debug!(%ip, error = %e, "PTR resolution failed");
                }
            });
        }
    }

    /// Resolve one client, honoring the per-row result cache. Returns the
    /// hostname when one is known after the call.
    pub async fn resolve_one(&self, ip: &str) -> Result<Option<String>, DomainError> {
        let addr: IpAddr = ip
            .parse()
            .map_err(|_| DomainError::InvalidIpAddress(ip.to_string()))?;
        let now = Utc::now();

        if let Some(client) = self.clients.get_by_ip(ip).await? {
            if !client.rdns_needs_refresh(now) {
                return Ok(client.rdns_name);
            }
            if client.display_name.is_some() {
                // Operator-assigned names make PTR noise pointless.
                return Ok(client.display_name);
            }
        }

        let rules = self.rules.get_enabled_ordered().await?;
        let matcher = RuleMatcher::new(&rules);
        let Some(nameserver) = matcher.nameserver_for(addr) else {
            return Ok(None);
        };

        match self.dns.lookup_ptr(addr, nameserver).await {
            Ok(Some(hostname)) => {
                self.clients
                    .set_rdns_result(ip, Some(&hostname), None, now)
                    .await?;
                Ok(Some(hostname))
            }
            Ok(None) | Err(_) => {
                let error = format!("PTR lookup failed via {nameserver}");
                self.clients
                    .set_rdns_result(ip, None, Some(&error), now)
                    .await?;
                Ok(None)
            }
        }
    }
}
