//! Per-job-name recurring status polls.
//!
//! [`PollScheduler`] owns at most one active timer per job name. Each
//! timer is a spawned task that waits one period, queries the backend
//! for the run's status, hands the result to the [`StatusReducer`], and
//! repeats until the reducer says stop or the timer is cancelled.
//!
//! Every [`start`](PollScheduler::start) allocates a new [`Generation`].
//! A tick result is only applied while its generation is still the live
//! timer for that name, so results that were in flight when a timer was
//! replaced or stopped are discarded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mbta_client::NotebookBackend;
use mbta_core::{JobId, JobName};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::reducer::{PollDirective, StatusReducer};
use crate::registry::JobRegistry;

/// Monotonic tag identifying one started timer.
pub type Generation = u64;

/// Shortest accepted poll period. Shorter periods, including zero, are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Shared, cheaply clonable scheduler handle.
#[derive(Clone)]
pub struct PollScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    table: Mutex<TimerTable>,
    backend: Arc<dyn NotebookBackend>,
    registry: JobRegistry,
    interval: Duration,
}

#[derive(Default)]
struct TimerTable {
    timers: HashMap<JobName, ActivePoll>,
    last_generation: Generation,
    /// Set by [`PollScheduler::stop_all`]; no timer may start afterwards.
    stopped: bool,
}

/// Bookkeeping for one running timer.
struct ActivePoll {
    generation: Generation,
    job_id: JobId,
    cancel: CancellationToken,
}

impl PollScheduler {
    /// `interval` is clamped to at least [`MIN_POLL_INTERVAL`].
    pub fn new(backend: Arc<dyn NotebookBackend>, registry: JobRegistry, interval: Duration) -> Self {
        if interval < MIN_POLL_INTERVAL {
            tracing::warn!(
                requested_ms = interval.as_millis() as u64,
                "Poll interval too short, using minimum",
            );
        }
        let interval = interval.max(MIN_POLL_INTERVAL);

        Self {
            inner: Arc::new(SchedulerInner {
                table: Mutex::new(TimerTable::default()),
                backend,
                registry,
                interval,
            }),
        }
    }

    /// Start polling `job_id` on behalf of `name`.
    ///
    /// Any timer already active for `name` is cancelled first. Returns the
    /// new timer's generation, or `None` once [`stop_all`](Self::stop_all)
    /// has run. Must be called from within a Tokio runtime.
    pub fn start(&self, name: &JobName, job_id: JobId) -> Option<Generation> {
        let mut table = self.lock();
        if table.stopped {
            tracing::warn!(job = %name, job_id = %job_id, "Scheduler stopped, not starting poll timer");
            return None;
        }

        if let Some(previous) = table.timers.remove(name) {
            tracing::debug!(
                job = %name,
                generation = previous.generation,
                job_id = %previous.job_id,
                "Replacing active poll timer",
            );
            previous.cancel.cancel();
        }

        table.last_generation += 1;
        let generation = table.last_generation;
        let cancel = CancellationToken::new();

        tokio::spawn(run_poll_loop(
            Arc::clone(&self.inner.backend),
            self.reducer(),
            name.clone(),
            job_id.clone(),
            generation,
            self.inner.interval,
            cancel.clone(),
        ));

        tracing::info!(
            job = %name,
            job_id = %job_id,
            generation,
            interval_ms = self.inner.interval.as_millis() as u64,
            "Poll timer started",
        );

        table.timers.insert(
            name.clone(),
            ActivePoll {
                generation,
                job_id,
                cancel,
            },
        );
        Some(generation)
    }

    /// Cancel the timer for `name`. Safe to call when none is active.
    ///
    /// Returns whether a timer was stopped.
    pub fn stop(&self, name: &JobName) -> bool {
        match self.lock().timers.remove(name) {
            Some(active) => {
                active.cancel.cancel();
                tracing::debug!(job = %name, generation = active.generation, "Poll timer stopped");
                true
            }
            None => false,
        }
    }

    /// Cancel every active timer and refuse to start new ones.
    ///
    /// Idempotent. Returns how many timers were cancelled by this call.
    pub fn stop_all(&self) -> usize {
        let mut table = self.lock();
        table.stopped = true;

        let count = table.timers.len();
        for (name, active) in table.timers.drain() {
            tracing::debug!(job = %name, generation = active.generation, "Poll timer stopped");
            active.cancel.cancel();
        }
        count
    }

    pub fn is_active(&self, name: &JobName) -> bool {
        self.lock().timers.contains_key(name)
    }

    /// Generation of the live timer for `name`, if any.
    pub fn generation(&self, name: &JobName) -> Option<Generation> {
        self.lock().timers.get(name).map(|a| a.generation)
    }

    pub fn active_count(&self) -> usize {
        self.lock().timers.len()
    }

    /// Reducer bound to this scheduler and its registry.
    pub fn reducer(&self) -> StatusReducer {
        StatusReducer::new(self.inner.registry.clone(), self.clone())
    }

    /// Lock the timer table if `generation` is still the live timer for
    /// `name`. The lease holds the lock until dropped, so a state write
    /// made while holding it is atomic with respect to stop/replace.
    pub(crate) fn lease<'a>(
        &'a self,
        name: &'a JobName,
        generation: Generation,
    ) -> Option<TimerLease<'a>> {
        let table = self.lock();
        let current = table.timers.get(name).map(|a| a.generation);
        if current != Some(generation) {
            return None;
        }
        Some(TimerLease { table, name })
    }

    fn lock(&self) -> MutexGuard<'_, TimerTable> {
        self.inner.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive hold on a live timer, see [`PollScheduler::lease`].
pub(crate) struct TimerLease<'a> {
    table: MutexGuard<'a, TimerTable>,
    name: &'a JobName,
}

impl TimerLease<'_> {
    /// Deregister the leased timer while still holding the lock.
    pub(crate) fn release(mut self) {
        if let Some(active) = self.table.timers.remove(self.name) {
            active.cancel.cancel();
            tracing::debug!(job = %self.name, generation = active.generation, "Poll timer finished");
        }
    }
}

/// Tick loop for one timer. At most one status request is outstanding.
async fn run_poll_loop(
    backend: Arc<dyn NotebookBackend>,
    reducer: StatusReducer,
    name: JobName,
    job_id: JobId,
    generation: Generation,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        tracing::debug!(job = %name, job_id = %job_id, generation, "Polling notebook status");

        // Dropping the request future on cancel discards its result.
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = backend.notebook_status(&job_id) => result,
        };

        if reducer.on_poll_result(&name, generation, result) == PollDirective::Stop {
            break;
        }
    }

    tracing::debug!(job = %name, generation, "Poll loop exited");
}
