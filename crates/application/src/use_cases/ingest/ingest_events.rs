use crate::ports::EventRepository;
use crate::services::SettingsService;
use crate::use_cases::ingest::PtrResolutionService;
use chrono::{DateTime, Utc};
use powerblockade_domain::{normalize_qname, DnsQueryEvent, DomainError};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One event as received on the wire, before validation. `event_seq` is
/// accepted for agent compatibility and discarded; dedup is on `event_id`
/// alone.
#[derive(Debug, Clone)]
pub struct IncomingEvent {
    pub ts: Option<DateTime<Utc>>,
    pub client_ip: String,
    pub qname: String,
    pub qtype: u16,
    pub rcode: u8,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub blocklist_name: Option<String>,
    pub latency_ms: Option<i64>,
    pub event_id: Option<String>,
    pub event_seq: Option<i64>,
}

/// Ingest pipeline: validate, normalize, insert as one idempotent batch,
/// then kick off best-effort PTR resolution for the batch's client IPs.
pub struct IngestEventsUseCase {
    events: Arc<dyn EventRepository>,
    settings: Arc<SettingsService>,
    ptr: Arc<PtrResolutionService>,
}

impl IngestEventsUseCase {
    pub fn new(
        events: Arc<dyn EventRepository>,
        settings: Arc<SettingsService>,
        ptr: Arc<PtrResolutionService>,
    ) -> Self {
        Self {
            events,
            settings,
            ptr,
        }
    }

    /// Returns the number of rows actually written (duplicates excluded),
    /// which is what the wire response reports back to the agent.
    #[instrument(skip(self, incoming), fields(batch = incoming.len()))]
    pub async fn execute(
        &self,
        node_id: i64,
        incoming: Vec<IncomingEvent>,
    ) -> Result<u64, DomainError> {
        let now = Utc::now();
        let mut rows = Vec::with_capacity(incoming.len());
        let mut ips: BTreeSet<String> = BTreeSet::new();

        for ev in incoming {
            // Invalid events are dropped silently; one bad agent must not
            // fail the batch.
            if ev.client_ip.parse::<IpAddr>().is_err() {
                debug!(client_ip = %ev.client_ip, "Dropping event with bad client IP");
                continue;
            }
            let qname = normalize_qname(&ev.qname);
            if qname.is_empty() {
                debug!("Dropping event with empty qname");
                continue;
            }

            ips.insert(ev.client_ip.clone());
            rows.push(DnsQueryEvent {
                id: None,
                event_id: ev.event_id,
                ts: ev.ts.unwrap_or(now),
                node_id: Some(node_id),
                client_ip: ev.client_ip,
                client_id: None,
                qname,
                qtype: ev.qtype,
                rcode: ev.rcode,
                blocked: ev.blocked,
                block_reason: ev.block_reason,
                blocklist_name: ev.blocklist_name,
                latency_ms: ev.latency_ms,
            });
        }

        if rows.is_empty() {
            return Ok(0);
        }

        let inserted = self.events.ingest_batch(rows).await?;

        // After commit: hostname resolution is fire-and-forget on the
        // bounded pool.
        if self.settings.ptr_resolution_enabled().await? {
            self.ptr.spawn_resolve(ips.into_iter().collect());
        }

        Ok(inserted)
    }
}
