//! Teardown of a job session.
//!
//! [`LifecycleGuard`] stops every poll timer and discards the registry
//! exactly once, either explicitly via [`teardown`](LifecycleGuard::teardown)
//! or when the guard is dropped with the owning view.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::registry::JobRegistry;
use crate::scheduler::PollScheduler;

pub struct LifecycleGuard {
    scheduler: PollScheduler,
    registry: JobRegistry,
    torn_down: AtomicBool,
}

impl LifecycleGuard {
    pub fn new(scheduler: PollScheduler, registry: JobRegistry) -> Self {
        Self {
            scheduler,
            registry,
            torn_down: AtomicBool::new(false),
        }
    }

    /// Stop all timers, then close the registry.
    ///
    /// The scheduler is stopped first so a submission completing
    /// concurrently cannot register a timer after the sweep. Requests
    /// still in flight may finish later; their results are discarded.
    /// Returns `false` if teardown had already run.
    pub fn teardown(&self) -> bool {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return false;
        }

        let stopped = self.scheduler.stop_all();
        self.registry.close();

        tracing::info!(stopped_timers = stopped, "Job session torn down");
        true
    }
}

impl Drop for LifecycleGuard {
    fn drop(&mut self) {
        self.teardown();
    }
}
