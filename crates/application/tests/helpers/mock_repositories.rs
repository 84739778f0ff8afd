#![allow(dead_code)]

//! In-memory fakes for the application ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_application::ports::*;
use powerblockade_domain::*;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockSettingsRepository {
    values: Mutex<HashMap<String, String>>,
}

impl MockSettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }
}

#[async_trait]
impl SettingsRepository for MockSettingsRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Policy store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockPolicyStore {
    pub files: Mutex<HashMap<String, String>>,
}

impl MockPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self, name: &str) -> Option<String> {
        self.files.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl PolicyStore for MockPolicyStore {
    async fn write_rpz(&self, filename: &str, content: &str) -> Result<(), DomainError> {
        self.files
            .lock()
            .unwrap()
            .insert(filename.to_string(), content.to_string());
        Ok(())
    }

    async fn write_forward_zones(&self, content: &str) -> Result<(), DomainError> {
        self.files
            .lock()
            .unwrap()
            .insert(FORWARD_ZONES_FILENAME.to_string(), content.to_string());
        Ok(())
    }

    async fn read_rpz_files(&self) -> Result<Vec<RpzFile>, DomainError> {
        let files = self.files.lock().unwrap();
        let mut out: Vec<RpzFile> = files
            .iter()
            .filter(|(name, _)| name.ends_with(".rpz"))
            .map(|(name, content)| RpzFile {
                filename: name.clone(),
                content: content.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Blocklists
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockBlocklistRepository {
    pub lists: Mutex<Vec<Blocklist>>,
    pub entries: Mutex<HashMap<i64, BTreeSet<String>>>,
}

impl MockBlocklistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(self, list: Blocklist, entries: &[&str]) -> Self {
        let id = list.id.expect("test blocklist needs an id");
        self.lists.lock().unwrap().push(list);
        self.entries
            .lock()
            .unwrap()
            .insert(id, entries.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn enabled_flag(&self, id: i64) -> bool {
        self.lists
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == Some(id))
            .map(|b| b.enabled)
            .unwrap_or(false)
    }
}

#[async_trait]
impl BlocklistRepository for MockBlocklistRepository {
    async fn create(&self, mut blocklist: Blocklist) -> Result<Blocklist, DomainError> {
        let mut lists = self.lists.lock().unwrap();
        if lists.iter().any(|b| b.url == blocklist.url) {
            return Err(DomainError::Conflict(format!(
                "Blocklist URL '{}' already exists",
                blocklist.url
            )));
        }
        let id = lists.iter().filter_map(|b| b.id).max().unwrap_or(0) + 1;
        blocklist.id = Some(id);
        lists.push(blocklist.clone());
        Ok(blocklist)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Blocklist>, DomainError> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == Some(id))
            .cloned())
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<Blocklist>, DomainError> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.url == url)
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<Blocklist>, DomainError> {
        Ok(self.lists.lock().unwrap().clone())
    }

    async fn get_enabled(&self) -> Result<Vec<Blocklist>, DomainError> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.enabled)
            .cloned()
            .collect())
    }

    async fn get_scheduled(&self) -> Result<Vec<Blocklist>, DomainError> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.schedule_enabled)
            .cloned()
            .collect())
    }

    async fn update(&self, blocklist: &Blocklist) -> Result<(), DomainError> {
        let mut lists = self.lists.lock().unwrap();
        let Some(slot) = lists.iter_mut().find(|b| b.id == blocklist.id) else {
            return Err(DomainError::NotFound("blocklist".to_string()));
        };
        *slot = blocklist.clone();
        Ok(())
    }

    async fn set_enabled(&self, id: i64, enabled: bool) -> Result<(), DomainError> {
        let mut lists = self.lists.lock().unwrap();
        if let Some(b) = lists.iter_mut().find(|b| b.id == Some(id)) {
            b.enabled = enabled;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.lists.lock().unwrap().retain(|b| b.id != Some(id));
        self.entries.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn record_fetch_success(
        &self,
        id: i64,
        entry_count: i64,
        etag: Option<&str>,
        last_modified: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut lists = self.lists.lock().unwrap();
        if let Some(b) = lists.iter_mut().find(|b| b.id == Some(id)) {
            b.last_update_status = Some("success".to_string());
            b.last_error = None;
            b.entry_count = entry_count;
            b.etag = etag.map(str::to_string);
            b.last_modified = last_modified.map(str::to_string);
            b.last_updated = Some(at);
        }
        Ok(())
    }

    async fn record_fetch_not_modified(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut lists = self.lists.lock().unwrap();
        if let Some(b) = lists.iter_mut().find(|b| b.id == Some(id)) {
            b.last_update_status = Some("success".to_string());
            b.last_updated = Some(at);
        }
        Ok(())
    }

    async fn record_fetch_failure(
        &self,
        id: i64,
        error: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut lists = self.lists.lock().unwrap();
        if let Some(b) = lists.iter_mut().find(|b| b.id == Some(id)) {
            b.last_update_status = Some("failed".to_string());
            b.last_error = Some(error.to_string());
            b.last_updated = Some(at);
        }
        Ok(())
    }

    async fn replace_entries(
        &self,
        blocklist_id: i64,
        domains: &BTreeSet<String>,
    ) -> Result<(), DomainError> {
        self.entries
            .lock()
            .unwrap()
            .insert(blocklist_id, domains.clone());
        Ok(())
    }

    async fn entries_for(&self, blocklist_id: i64) -> Result<Vec<String>, DomainError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(&blocklist_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn search_entries(&self, domain: &str) -> Result<Vec<DomainSearchHit>, DomainError> {
        let entries = self.entries.lock().unwrap();
        let lists = self.lists.lock().unwrap();
        let mut hits = Vec::new();
        for (list_id, domains) in entries.iter() {
            if domains.contains(domain) {
                if let Some(list) = lists.iter().find(|b| b.id == Some(*list_id)) {
                    hits.push(DomainSearchHit {
                        domain: domain.to_string(),
                        source: list.name.clone(),
                        blocklist_id: Some(*list_id),
                        list_type: list.list_type,
                    });
                }
            }
        }
        Ok(hits)
    }
}

// ---------------------------------------------------------------------------
// Manual entries
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockManualEntryRepository {
    pub entries: Mutex<Vec<ManualEntry>>,
}

impl MockManualEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, domain: &str, entry_type: ListType) -> Self {
        let id = self.entries.lock().unwrap().len() as i64 + 1;
        self.entries.lock().unwrap().push(ManualEntry {
            id: Some(id),
            domain: domain.to_string(),
            entry_type,
            created_at: None,
        });
        self
    }
}

#[async_trait]
impl ManualEntryRepository for MockManualEntryRepository {
    async fn create(&self, mut entry: ManualEntry) -> Result<ManualEntry, DomainError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|e| e.domain == entry.domain) {
            return Err(DomainError::Conflict(entry.domain));
        }
        entry.id = Some(entries.len() as i64 + 1);
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn get_all(&self) -> Result<Vec<ManualEntry>, DomainError> {
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn get_by_domain(&self, domain: &str) -> Result<Option<ManualEntry>, DomainError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.domain.eq_ignore_ascii_case(domain))
            .cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.entries.lock().unwrap().retain(|e| e.id != Some(id));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Forward zones
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockForwardZoneRepository {
    pub zones: Mutex<Vec<ForwardZone>>,
}

impl MockForwardZoneRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(self, zone: ForwardZone) -> Self {
        self.zones.lock().unwrap().push(zone);
        self
    }
}

#[async_trait]
impl ForwardZoneRepository for MockForwardZoneRepository {
    async fn create(&self, mut zone: ForwardZone) -> Result<ForwardZone, DomainError> {
        let mut zones = self.zones.lock().unwrap();
        if zones
            .iter()
            .any(|z| z.domain == zone.domain && z.node_id == zone.node_id)
        {
            return Err(DomainError::Conflict(zone.domain));
        }
        zone.id = Some(zones.iter().filter_map(|z| z.id).max().unwrap_or(0) + 1);
        zones.push(zone.clone());
        Ok(zone)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ForwardZone>, DomainError> {
        Ok(self
            .zones
            .lock()
            .unwrap()
            .iter()
            .find(|z| z.id == Some(id))
            .cloned())
    }

    async fn get_enabled_global(&self) -> Result<Vec<ForwardZone>, DomainError> {
        let mut zones: Vec<ForwardZone> = self
            .zones
            .lock()
            .unwrap()
            .iter()
            .filter(|z| z.enabled && z.node_id.is_none())
            .cloned()
            .collect();
        zones.sort_by(|a, b| a.domain.cmp(&b.domain));
        Ok(zones)
    }

    async fn get_for_node(&self, node_id: i64) -> Result<Vec<ForwardZone>, DomainError> {
        Ok(self
            .zones
            .lock()
            .unwrap()
            .iter()
            .filter(|z| z.enabled && (z.node_id.is_none() || z.node_id == Some(node_id)))
            .cloned()
            .collect())
    }

    async fn update(&self, zone: &ForwardZone) -> Result<(), DomainError> {
        let mut zones = self.zones.lock().unwrap();
        let Some(slot) = zones.iter_mut().find(|z| z.id == zone.id) else {
            return Err(DomainError::NotFound("forward zone".to_string()));
        };
        *slot = zone.clone();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.zones.lock().unwrap().retain(|z| z.id != Some(id));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config changes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockConfigChangeRepository {
    pub changes: Mutex<Vec<ConfigChange>>,
}

impl MockConfigChangeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.changes.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<ConfigChange> {
        self.changes.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ConfigChangeRepository for MockConfigChangeRepository {
    async fn record(&self, mut change: ConfigChange) -> Result<ConfigChange, DomainError> {
        let mut changes = self.changes.lock().unwrap();
        change.id = Some(changes.len() as i64 + 1);
        change.created_at = Some(Utc::now());
        changes.push(change.clone());
        Ok(change)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ConfigChange>, DomainError> {
        Ok(self
            .changes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == Some(id))
            .cloned())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ConfigChange>, DomainError> {
        let changes = self.changes.lock().unwrap();
        Ok(changes.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn for_entity(
        &self,
        entity_type: &str,
        entity_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<ConfigChange>, DomainError> {
        let changes = self.changes.lock().unwrap();
        Ok(changes
            .iter()
            .rev()
            .filter(|c| c.entity_type == entity_type)
            .filter(|c| entity_id.is_none() || c.entity_id == entity_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
