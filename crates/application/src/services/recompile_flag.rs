use std::sync::atomic::{AtomicBool, Ordering};

/// Cross-task "a recompile is wanted" latch. Enabling blocking and flipping
/// schedules set it; the next scheduler tick consumes it and runs the
/// compiler. Cheap enough to share everywhere as an `Arc`.
#[derive(Debug, Default)]
pub struct RecompileFlag {
    pending: AtomicBool,
}

impl RecompileFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }

    /// Returns true at most once per request.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }
}
