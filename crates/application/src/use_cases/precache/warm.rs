use crate::ports::{DnsClient, EventRepository};
use crate::services::SettingsService;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use powerblockade_domain::DomainError;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Domains warmed between throttle sleeps.
const BATCH_SIZE: usize = 50;
const BATCH_DELAY_MS: u64 = 100;

#[derive(Debug, Clone, Default)]
pub struct WarmingReport {
    pub success: u32,
    pub failed: u32,
    pub candidates: usize,
    pub skipped_fresh: usize,
}

#[derive(Debug, Clone, Copy)]
struct DomainTtl {
    ttl: u32,
    last_warmed: DateTime<Utc>,
}

/// Keeps the resolver cache hot for the most-queried domains.
///
/// The TTL map is process-local; after a restart the warmer simply
/// reconverges from scratch.
pub struct PrecacheWarmUseCase {
    events: Arc<dyn EventRepository>,
    settings: Arc<SettingsService>,
    dns: Arc<dyn DnsClient>,
    resolver_addr: String,
    ttl_cache: DashMap<String, DomainTtl>,
}

impl PrecacheWarmUseCase {
    pub fn new(
        events: Arc<dyn EventRepository>,
        settings: Arc<SettingsService>,
        dns: Arc<dyn DnsClient>,
        resolver_addr: String,
    ) -> Self {
        Self {
            events,
            settings,
            dns,
            resolver_addr,
            ttl_cache: DashMap::new(),
        }
    }

    fn needs_refresh(
        &self,
        domain: &str,
        now: DateTime<Utc>,
        ignore_ttl: bool,
        custom_refresh_minutes: i64,
    ) -> bool {
        let Some(cached) = self.ttl_cache.get(domain) else {
            return true;
        };

        let threshold = if ignore_ttl {
            Duration::minutes(custom_refresh_minutes)
        } else {
            let safety_margin = (cached.ttl as f64 * 0.2).max(30.0);
            Duration::seconds((cached.ttl as f64 - safety_margin) as i64)
        };

        now - cached.last_warmed >= threshold
    }

    #[instrument(skip(self), name = "precache_warm")]
    pub async fn execute(&self) -> Result<WarmingReport, DomainError> {
        if !self.settings.precache_enabled().await? {
            debug!("Precache warming disabled");
            return Ok(WarmingReport::default());
        }

        let now = Utc::now();
        let limit = self.settings.precache_domain_count().await?;
        let ignore_ttl = self.settings.precache_ignore_ttl().await?;
        let custom_refresh = self.settings.precache_custom_refresh_minutes().await?;

        let candidates = self
            .events
            .top_domains(now - Duration::hours(24), limit)
            .await?;
        if candidates.is_empty() {
            debug!("No domains to warm");
            return Ok(WarmingReport::default());
        }

        let to_warm: Vec<&String> = candidates
            .iter()
            .filter(|d| self.needs_refresh(d, now, ignore_ttl, custom_refresh))
            .collect();
        let skipped_fresh = candidates.len() - to_warm.len();
        if to_warm.is_empty() {
            debug!(candidates = candidates.len(), "All warm domains still fresh");
            return Ok(WarmingReport {
                candidates: candidates.len(),
                skipped_fresh,
                ..Default::default()
            });
        }

        let mut report = WarmingReport {
            candidates: candidates.len(),
            skipped_fresh,
            ..Default::default()
        };

        let total = to_warm.len();
        for (i, domain) in to_warm.into_iter().enumerate() {
            match self.dns.warm_a(domain, &self.resolver_addr).await {
                Ok(Some(ttl)) => {
                    self.ttl_cache.insert(
                        domain.clone(),
                        DomainTtl {
                            ttl,
                            last_warmed: Utc::now(),
                        },
                    );
                    report.success += 1;
                }
                Ok(None) | Err(_) => report.failed += 1,
            }

            if (i + 1) % BATCH_SIZE == 0 && i + 1 < total {
                tokio::time::sleep(std::time::Duration::from_millis(BATCH_DELAY_MS)).await;
            }
        }

        info!(
            warmed = report.success,
            failed = report.failed,
            skipped_fresh = report.skipped_fresh,
            "Precache warming completed"
        );
        Ok(report)
    }

    /// Freshness breakdown of the in-process TTL map.
    pub fn stats(&self) -> (usize, usize, usize) {
        let now = Utc::now();
        let mut fresh = 0;
        let mut expired = 0;
        for entry in self.ttl_cache.iter() {
            let age = (now - entry.last_warmed).num_seconds();
            if age < entry.ttl as i64 {
                fresh += 1;
            } else {
                expired += 1;
            }
        }
        (self.ttl_cache.len(), fresh, expired)
    }
}
