use async_trait::async_trait;
use powerblockade_application::ports::{
    BlocklistFetcher, BlocklistRepository as _, FetchOutcome,
};
use powerblockade_application::services::SettingsService;
use powerblockade_application::use_cases::{CompilePolicyUseCase, RefreshBlocklistsUseCase};
use powerblockade_domain::{Blocklist, BlocklistFormat, DomainError, ListType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

mod helpers;
use helpers::{
    MockBlocklistRepository, MockForwardZoneRepository, MockManualEntryRepository,
    MockPolicyStore, MockSettingsRepository,
};

/// Scripted fetcher: one outcome per URL, with a call counter.
struct ScriptedFetcher {
    outcomes: Mutex<HashMap<String, Result<FetchOutcome, String>>>,
    calls: AtomicU32,
}

impl ScriptedFetcher {
    fn new() -> Self {
        Self {
            outcomes: Mutex::new(HashMap::new()),
            calls: AtomicU32::new(0),
        }
    }

    fn with_body(self, url: &str, body: &str) -> Self {
        self.outcomes.lock().unwrap().insert(
            url.to_string(),
            Ok(FetchOutcome::Fetched {
                body: body.to_string(),
                etag: Some("\"v1\"".to_string()),
                last_modified: None,
            }),
        );
        self
    }

    fn with_not_modified(self, url: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(FetchOutcome::NotModified));
        self
    }

    fn with_error(self, url: &str, error: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(error.to_string()));
        self
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlocklistFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        url: &str,
        _etag: Option<&str>,
        _last_modified: Option<&str>,
    ) -> Result<FetchOutcome, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcomes.lock().unwrap().get(url) {
            Some(Ok(outcome)) => Ok(outcome.clone()),
            Some(Err(msg)) => Err(DomainError::UpstreamFetch(msg.clone())),
            None => Err(DomainError::UpstreamFetch(format!("no script for {url}"))),
        }
    }
}

fn due_list(id: i64, url: &str) -> Blocklist {
    let mut bl = Blocklist::new(
        format!("list-{id}"),
        url.to_string(),
        BlocklistFormat::Hosts,
        ListType::Block,
    );
    bl.id = Some(id);
    // Never fetched: due immediately.
    bl
}

struct Fixture {
    blocklists: Arc<MockBlocklistRepository>,
    fetcher: Arc<ScriptedFetcher>,
    store: Arc<MockPolicyStore>,
    refresh: RefreshBlocklistsUseCase,
}

fn fixture(blocklists: MockBlocklistRepository, fetcher: ScriptedFetcher) -> Fixture {
    let blocklists = Arc::new(blocklists);
    let fetcher = Arc::new(fetcher);
    let store = Arc::new(MockPolicyStore::new());
    let settings = Arc::new(SettingsService::new(Arc::new(MockSettingsRepository::new())));
    let compile = Arc::new(CompilePolicyUseCase::new(
        blocklists.clone(),
        Arc::new(MockManualEntryRepository::new()),
        Arc::new(MockForwardZoneRepository::new()),
        settings,
        store.clone(),
    ));
    let refresh = RefreshBlocklistsUseCase::new(blocklists.clone(), fetcher.clone(), compile);
    Fixture {
        blocklists,
        fetcher,
        store,
        refresh,
    }
}

#[tokio::test]
async fn fetched_list_is_parsed_stored_and_compiled() {
    let url = "https://lists.example/ads.txt";
    let fx = fixture(
        MockBlocklistRepository::new().with_list(due_list(1, url), &[]),
        ScriptedFetcher::new().with_body(
            url,
            "# ads\n0.0.0.0 ads.example.com\n127.0.0.1 Tracker.EXAMPLE.com\n",
        ),
    );

    let report = fx.refresh.execute().await.unwrap();
    assert_eq!(report.updated, 1);
    assert!(report.recompiled);

    let stored = fx.blocklists.entries_for(1).await.unwrap();
    assert_eq!(stored, vec!["ads.example.com", "tracker.example.com"]);

    let list = fx.blocklists.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(list.last_update_status.as_deref(), Some("success"));
    assert_eq!(list.entry_count, 2);
    assert_eq!(list.etag.as_deref(), Some("\"v1\""));

    let combined = fx.store.file("blocklist-combined.rpz").unwrap();
    assert!(combined.contains("ads.example.com. CNAME .\n"));
}

#[tokio::test]
async fn not_modified_refreshes_status_without_touching_entries() {
    let url = "https://lists.example/ads.txt";
    let fx = fixture(
        MockBlocklistRepository::new().with_list(due_list(1, url), &["kept.example"]),
        ScriptedFetcher::new().with_not_modified(url),
    );

    let report = fx.refresh.execute().await.unwrap();
    assert_eq!(report.not_modified, 1);
    assert_eq!(report.updated, 0);
    assert!(!report.recompiled);

    assert_eq!(
        fx.blocklists.entries_for(1).await.unwrap(),
        vec!["kept.example"]
    );
}

#[tokio::test]
async fn one_failing_list_does_not_stop_the_others() {
    let good = "https://lists.example/good.txt";
    let bad = "https://lists.example/bad.txt";
    let fx = fixture(
        MockBlocklistRepository::new()
            .with_list(due_list(1, bad), &["old.example"])
            .with_list(due_list(2, good), &[]),
        ScriptedFetcher::new()
            .with_error(bad, "connection refused")
            .with_body(good, "fresh.example\n"),
    );

    let report = fx.refresh.execute().await.unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.failed, 1);

    let failed = fx.blocklists.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(failed.last_update_status.as_deref(), Some("failed"));
    assert!(failed.last_error.as_deref().unwrap().contains("connection refused"));
    // Prior entries for the failed list survive.
    assert_eq!(
        fx.blocklists.entries_for(1).await.unwrap(),
        vec!["old.example"]
    );
}

#[tokio::test]
async fn lists_not_yet_due_are_skipped() {
    let url = "https://lists.example/ads.txt";
    let mut fresh = due_list(1, url);
    fresh.last_updated = Some(chrono::Utc::now());

    let fx = fixture(
        MockBlocklistRepository::new().with_list(fresh, &[]),
        ScriptedFetcher::new().with_body(url, "x.example\n"),
    );

    let report = fx.refresh.execute().await.unwrap();
    assert_eq!(report.updated + report.failed + report.not_modified, 0);
    assert_eq!(fx.fetcher.call_count(), 0);
}
