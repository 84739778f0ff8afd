use crate::ports::{BlocklistRepository, ManualEntryRepository};
use powerblockade_domain::{DomainError, DomainSearchHit};
use std::sync::Arc;

/// Exact-domain lookup across blocklist entries and manual entries, used by
/// operators to answer "why is this domain blocked".
pub struct SearchDomainUseCase {
    blocklists: Arc<dyn BlocklistRepository>,
    manual_entries: Arc<dyn ManualEntryRepository>,
}

impl SearchDomainUseCase {
    pub fn new(
        blocklists: Arc<dyn BlocklistRepository>,
        manual_entries: Arc<dyn ManualEntryRepository>,
    ) -> Self {
        Self {
            blocklists,
            manual_entries,
        }
    }

    pub async fn execute(&self, query: &str) -> Result<Vec<DomainSearchHit>, DomainError> {
        let q = query.trim().to_ascii_lowercase();
        if q.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = self.blocklists.search_entries(&q).await?;

        if let Some(entry) = self.manual_entries.get_by_domain(&q).await? {
            hits.push(DomainSearchHit {
                domain: entry.domain,
                source: "Manual Entry".to_string(),
                blocklist_id: None,
                list_type: entry.entry_type,
            });
        }

        Ok(hits)
    }
}
