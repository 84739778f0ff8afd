//! PowerBlockade background jobs.
//!
//! One struct per periodic duty, all registered on a single `JobRunner`
//! that owns the shared cancellation token.

pub mod blocking_resume;
pub mod blocklist_refresh;
pub mod clock;
pub mod local_metrics;
pub mod precache;
pub mod retention;
pub mod rollup;
pub mod runner;
pub mod schedule_check;

pub use blocking_resume::BlockingResumeJob;
pub use blocklist_refresh::BlocklistRefreshJob;
pub use local_metrics::LocalMetricsJob;
pub use precache::PrecacheJob;
pub use retention::RetentionJob;
pub use rollup::RollupJob;
pub use runner::{JobRunner, JobRunnerHandle};
pub use schedule_check::ScheduleCheckJob;
