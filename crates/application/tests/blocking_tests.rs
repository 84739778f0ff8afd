use chrono::{Duration, Utc};
use powerblockade_application::services::{AuditLog, RecompileFlag, SettingsService};
use powerblockade_application::use_cases::ManageBlockingUseCase;
use powerblockade_domain::{settings, BlockingState};
use std::sync::Arc;

mod helpers;
use helpers::{MockConfigChangeRepository, MockPolicyStore, MockSettingsRepository};

struct Fixture {
    settings: Arc<SettingsService>,
    store: Arc<MockPolicyStore>,
    audit: Arc<MockConfigChangeRepository>,
    recompile: Arc<RecompileFlag>,
    blocking: ManageBlockingUseCase,
}

fn fixture() -> Fixture {
    let settings = Arc::new(SettingsService::new(Arc::new(MockSettingsRepository::new())));
    let store = Arc::new(MockPolicyStore::new());
    let audit_repo = Arc::new(MockConfigChangeRepository::new());
    let audit = Arc::new(AuditLog::new(audit_repo.clone()));
    let recompile = Arc::new(RecompileFlag::new());
    let blocking = ManageBlockingUseCase::new(
        settings.clone(),
        store.clone(),
        audit,
        recompile.clone(),
    );
    Fixture {
        settings,
        store,
        audit: audit_repo,
        recompile,
        blocking,
    }
}

#[tokio::test]
async fn disable_writes_the_empty_override_zone_before_returning() {
    let fx = fixture();

    let status = fx.blocking.disable(Some(1)).await.unwrap();
    assert_eq!(status.state, "disabled");
    assert!(!status.active);

    let combined = fx.store.file("blocklist-combined.rpz").unwrap();
    assert_eq!(combined.matches("SOA").count(), 1);
    assert_eq!(combined.matches(" NS ").count(), 1);
    assert_eq!(combined.matches("CNAME").count(), 0);

    let change = fx.audit.last().unwrap();
    assert_eq!(change.action, "blocking_disable");
    assert_eq!(change.actor_user_id, Some(1));
}

#[tokio::test]
async fn enable_requests_a_recompile_instead_of_compiling_inline() {
    let fx = fixture();
    fx.blocking.disable(None).await.unwrap();
    assert!(!fx.recompile.is_pending());

    let status = fx.blocking.enable(None).await.unwrap();
    assert_eq!(status.state, "enabled");
    assert!(status.active);
    assert!(fx.recompile.is_pending());
}

#[tokio::test]
async fn pause_validates_its_bounds() {
    let fx = fixture();
    assert!(fx.blocking.pause(0, None).await.is_err());
    assert!(fx.blocking.pause(1441, None).await.is_err());

    let status = fx.blocking.pause(15, None).await.unwrap();
    assert!(!status.active);
    let remaining = status.pause_remaining_seconds.unwrap();
    assert!(remaining > 14 * 60 && remaining <= 15 * 60);

    // Pause also clears the zone synchronously.
    assert!(fx.store.file("blocklist-combined.rpz").is_some());
}

#[tokio::test]
async fn expired_pause_resumes_to_enabled_on_the_next_tick() {
    let fx = fixture();

    // Simulate a pause that ended a minute ago.
    let past = BlockingState::PausedUntil(Utc::now() - Duration::seconds(61));
    fx.settings.set_blocking_state(&past).await.unwrap();
    assert!(fx.settings.blocking_state().await.unwrap().is_active(Utc::now()));

    let resumed = fx.blocking.resume_if_expired().await.unwrap();
    assert!(resumed);
    assert_eq!(
        fx.settings.get(settings::BLOCKING_STATE).await.unwrap(),
        "enabled"
    );
    assert!(fx.recompile.is_pending());

    // A second tick is a no-op.
    assert!(!fx.blocking.resume_if_expired().await.unwrap());
}

#[tokio::test]
async fn running_pause_does_not_resume_early() {
    let fx = fixture();
    fx.blocking.pause(30, None).await.unwrap();

    assert!(!fx.blocking.resume_if_expired().await.unwrap());
    let status = fx.blocking.status().await.unwrap();
    assert!(!status.active);
    assert!(status.pause_remaining_seconds.is_some());
}
