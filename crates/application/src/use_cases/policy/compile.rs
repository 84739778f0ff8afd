use crate::ports::{
    BlocklistRepository, ForwardZoneRepository, ManualEntryRepository, PolicyStore,
    RPZ_COMBINED_FILENAME, RPZ_WHITELIST_FILENAME,
};
use crate::services::SettingsService;
use chrono::Utc;
use powerblockade_domain::policy;
use powerblockade_domain::{DomainError, ListType};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct CompileReport {
    pub blocked_count: usize,
    pub allow_count: usize,
    pub removed_by_whitelist: usize,
    pub config_version: String,
}

/// Materializes committed policy into the shared directory: the two RPZ
/// zones, the forward-zones file, and the bundle version setting.
///
/// Compiles from stored `BlocklistEntry` rows; a list whose last fetch did
/// not succeed is excluded without failing the compile. When the blocking
/// state machine reports inactive, the combined zone is rendered empty so
/// nodes serve no blocks.
pub struct CompilePolicyUseCase {
    blocklists: Arc<dyn BlocklistRepository>,
    manual_entries: Arc<dyn ManualEntryRepository>,
    forward_zones: Arc<dyn ForwardZoneRepository>,
    settings: Arc<SettingsService>,
    store: Arc<dyn PolicyStore>,
}

impl CompilePolicyUseCase {
    pub fn new(
        blocklists: Arc<dyn BlocklistRepository>,
        manual_entries: Arc<dyn ManualEntryRepository>,
        forward_zones: Arc<dyn ForwardZoneRepository>,
        settings: Arc<SettingsService>,
        store: Arc<dyn PolicyStore>,
    ) -> Self {
        Self {
            blocklists,
            manual_entries,
            forward_zones,
            settings,
            store,
        }
    }

    #[instrument(skip(self), name = "compile_policy")]
    pub async fn execute(&self) -> Result<CompileReport, DomainError> {
        let now = Utc::now();
        let serial = now.timestamp();

        let mut blocked: BTreeSet<String> = BTreeSet::new();
        let mut allow: BTreeSet<String> = BTreeSet::new();

        for entry in self.manual_entries.get_all().await? {
            match entry.entry_type {
                ListType::Block => blocked.insert(entry.domain),
                ListType::Allow => allow.insert(entry.domain),
            };
        }

        for bl in self.blocklists.get_enabled().await? {
            if bl.last_update_status.as_deref() != Some("success") {
                continue;
            }
            let Some(id) = bl.id else { continue };
            let domains = self.blocklists.entries_for(id).await?;
            match bl.list_type {
                ListType::Allow => allow.extend(domains),
                ListType::Block => blocked.extend(domains),
            }
        }

        let effective: BTreeSet<String> = blocked.difference(&allow).cloned().collect();
        let removed = blocked.len() - effective.len();

        let active = self.settings.blocking_state().await?.is_active(now);
        if !active {
            warn!("Blocking inactive, compiling empty combined zone");
        }
        let empty = BTreeSet::new();
        let combined_domains = if active { &effective } else { &empty };

        let combined = policy::render_rpz_zone(combined_domains, "blocklist-combined", serial);
        let whitelist = policy::render_rpz_whitelist(&allow, serial);

        self.store.write_rpz(RPZ_COMBINED_FILENAME, &combined).await?;
        self.store.write_rpz(RPZ_WHITELIST_FILENAME, &whitelist).await?;

        let zones = self.forward_zones.get_enabled_global().await?;
        let forward_rules: Vec<String> = zones.iter().map(|z| z.config_line()).collect();
        self.store
            .write_forward_zones(&render_forward_zones_config(&forward_rules))
            .await?;

        // Version hashes use serial 0 so identical policy always yields an
        // identical bundle version.
        let file_hashes = vec![
            policy::content_hash(&policy::render_rpz_zone(
                combined_domains,
                "blocklist-combined",
                0,
            )),
            policy::content_hash(&policy::render_rpz_whitelist(&allow, 0)),
        ];
        let version = policy::bundle_version(&file_hashes, &forward_rules);
        self.settings.set_config_version(&version).await?;

        info!(
            blocked = effective.len(),
            allow = allow.len(),
            removed_by_whitelist = removed,
            forward_zones = zones.len(),
            config_version = %version,
            "Policy compiled"
        );

        Ok(CompileReport {
            blocked_count: effective.len(),
            allow_count: allow.len(),
            removed_by_whitelist: removed,
            config_version: version,
        })
    }
}

fn render_forward_zones_config(rules: &[String]) -> String {
    let mut out = String::from(
        "# Forward zones for the recursor\n# Generated automatically - do not edit manually\n",
    );
    for rule in rules {
        out.push_str(rule);
        out.push('\n');
    }
    out
}
