//! Scheduler-domain behavior: ticking jobs do their work and the runner
//! stops them within the grace period.

use chrono::{Duration as ChronoDuration, Utc};
use powerblockade_domain::BlockingState;

use powerblockade_jobs::{BlockingResumeJob, JobRunner, ScheduleCheckJob};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[path = "../common/fixtures.rs"]
mod fixtures;
use fixtures::control_plane;

#[tokio::test]
async fn blocking_resume_job_flips_an_expired_pause() {
    let cp = control_plane().await;

    cp.settings
        .set_blocking_state(&BlockingState::PausedUntil(
            Utc::now() - ChronoDuration::seconds(30),
        ))
        .await
        .unwrap();

    let runner = JobRunner::new().with_blocking_resume(
        BlockingResumeJob::new(
            cp.blocking.clone(),
            cp.compile.clone(),
            cp.recompile.clone(),
        )
        .with_interval(1),
    );
    let handle = runner.start().await;

    // Give the job a tick to fire.
    sleep(Duration::from_millis(1300)).await;

    let status = cp.blocking.status().await.unwrap();
    assert_eq!(status.state, "enabled");
    // The requested recompile already ran, so the flag is drained.
    assert!(!cp.recompile.is_pending());

    handle.shutdown(Duration::from_secs(5)).await;
}

#[tokio::test]
async fn runner_shutdown_stops_jobs_within_the_grace_period() {
    let cp = control_plane().await;

    let runner = JobRunner::new()
        .with_schedule_check(
            ScheduleCheckJob::new(Arc::new(
                powerblockade_application::use_cases::ScheduleCheckUseCase::new(
                    cp.blocklists.clone(),
                    cp.settings.clone(),
                    Arc::new(powerblockade_application::services::AuditLog::new(Arc::new(
                        powerblockade_infrastructure::repositories::SqliteConfigChangeRepository::new(
                            cp.pool.clone(),
                        ),
                    ))),
                    cp.compile.clone(),
                ),
            ))
            .with_interval(1),
        )
        .with_blocking_resume(
            BlockingResumeJob::new(
                cp.blocking.clone(),
                cp.compile.clone(),
                cp.recompile.clone(),
            )
            .with_interval(1),
        );

    let handle = runner.start().await;
    sleep(Duration::from_millis(100)).await;

    let started = std::time::Instant::now();
    handle.shutdown(Duration::from_secs(5)).await;
    assert!(started.elapsed() < Duration::from_secs(5));
}
