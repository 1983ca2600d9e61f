//! One dashboard view's worth of job orchestration.
//!
//! [`JobSession`] owns the registry, scheduler and launcher for a fixed
//! set of job names, plus the [`LifecycleGuard`] that tears them down.
//! Dropping the session tears it down.

use std::sync::Arc;
use std::time::Duration;

use mbta_client::NotebookBackend;
use mbta_core::{JobName, JobState};
use tokio::sync::broadcast;

use crate::guard::LifecycleGuard;
use crate::launcher::{Launcher, SubmitOutcome};
use crate::reducer::StatusReducer;
use crate::registry::{JobChange, JobRegistry};
use crate::scheduler::PollScheduler;

/// Default period between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

pub struct JobSession {
    registry: JobRegistry,
    scheduler: PollScheduler,
    launcher: Launcher,
    guard: LifecycleGuard,
}

impl JobSession {
    /// Create a session tracking `names`, all starting `idle`.
    pub fn open(
        backend: Arc<dyn NotebookBackend>,
        names: impl IntoIterator<Item = JobName>,
        config: SessionConfig,
    ) -> Self {
        let registry = JobRegistry::new(names);
        let scheduler = PollScheduler::new(
            Arc::clone(&backend),
            registry.clone(),
            config.poll_interval,
        );
        let launcher = Launcher::new(registry.clone(), scheduler.clone(), backend);
        let guard = LifecycleGuard::new(scheduler.clone(), registry.clone());

        tracing::debug!(
            jobs = registry.names().len(),
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            "Job session opened",
        );

        Self {
            registry,
            scheduler,
            launcher,
            guard,
        }
    }

    pub async fn submit(&self, name: &JobName) -> SubmitOutcome {
        self.launcher.submit(name).await
    }

    pub fn state(&self, name: &JobName) -> Option<JobState> {
        self.registry.get(name)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobChange> {
        self.registry.subscribe()
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    pub fn reducer(&self) -> StatusReducer {
        self.scheduler.reducer()
    }

    /// Stop all polling and discard the registry. Runs at most once.
    pub fn teardown(&self) -> bool {
        self.guard.teardown()
    }
}
