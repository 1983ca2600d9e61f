//! Job name to [`JobState`] mapping.
//!
//! [`JobRegistry`] is the single source of truth the view renders from.
//! The key set is fixed at construction: every known name always has
//! exactly one record, and unknown names are never inserted.
//!
//! Every applied update is published as a [`JobChange`] on a
//! [`tokio::sync::broadcast`] channel carrying the new snapshot for that
//! name only. Call [`JobRegistry::subscribe`] to receive them.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use mbta_core::{JobName, JobState, JobStatus, JobUpdate};
use tokio::sync::broadcast;

/// Broadcast channel capacity for change notifications.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Message shown while a submission is in flight.
pub(crate) const QUEUED_MESSAGE: &str = "Queued";

/// A record changed. `state` is the full post-merge snapshot.
#[derive(Debug, Clone)]
pub struct JobChange {
    pub name: JobName,
    pub state: JobState,
}

/// Result of the submission guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// The record is now `pending` and the caller owns this run.
    Admitted,
    /// A run is already pending or running for this name.
    Busy(JobStatus),
    Unknown,
    Closed,
}

/// Shared, cheaply clonable registry handle.
#[derive(Clone)]
pub struct JobRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    table: RwLock<RegistryTable>,
    changes: broadcast::Sender<JobChange>,
}

struct RegistryTable {
    jobs: HashMap<JobName, JobState>,
    /// Set at teardown. A closed registry is read-only and silent.
    closed: bool,
}

impl JobRegistry {
    /// Create a registry with one `idle` record per name.
    ///
    /// Duplicate names collapse into a single record.
    pub fn new(names: impl IntoIterator<Item = JobName>) -> Self {
        let jobs = names
            .into_iter()
            .map(|name| (name.clone(), JobState::idle(name)))
            .collect();
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(RegistryInner {
                table: RwLock::new(RegistryTable {
                    jobs,
                    closed: false,
                }),
                changes,
            }),
        }
    }

    /// Known job names, sorted.
    pub fn names(&self) -> Vec<JobName> {
        let table = self.read();
        let mut names: Vec<JobName> = table.jobs.keys().cloned().collect();
        names.sort();
        names
    }

    /// Current state for `name`, or `None` if the name is not known.
    pub fn get(&self, name: &JobName) -> Option<JobState> {
        self.read().jobs.get(name).cloned()
    }

    /// Every record, sorted by name.
    pub fn snapshot(&self) -> Vec<JobState> {
        let table = self.read();
        let mut states: Vec<JobState> = table.jobs.values().cloned().collect();
        states.sort_by(|a, b| a.name.cmp(&b.name));
        states
    }

    /// Shallow-merge `update` into the record for `name`.
    ///
    /// Returns `false` when the update was not applied: the name is
    /// unknown or the registry has been closed. A [`JobChange`] is emitted
    /// only when a field actually changed.
    pub fn set(&self, name: &JobName, update: JobUpdate) -> bool {
        self.transition(name, |_| (update, ())).is_some()
    }

    /// Atomically read the record for `name`, derive an update from it and
    /// apply that update. Returns `None` under the same conditions as
    /// [`set`](Self::set).
    pub(crate) fn transition<R>(
        &self,
        name: &JobName,
        f: impl FnOnce(&JobState) -> (JobUpdate, R),
    ) -> Option<R> {
        let mut table = self.write();
        if table.closed {
            tracing::debug!(job = %name, "Ignoring update for closed registry");
            return None;
        }
        let Some(state) = table.jobs.get_mut(name) else {
            tracing::warn!(job = %name, "Ignoring update for unknown job");
            return None;
        };

        let (update, result) = f(state);
        if state.apply(update) {
            // Sent under the lock so notifications for one name stay in order.
            let _ = self.inner.changes.send(JobChange {
                name: name.clone(),
                state: state.clone(),
            });
        }
        Some(result)
    }

    /// Guard for a new submission.
    ///
    /// If no run is active for `name`, flips it to `pending` with the
    /// queued message in the same critical section, so a racing second
    /// submission observes `pending` and backs off.
    pub(crate) fn begin_submission(&self, name: &JobName) -> Admission {
        {
            let table = self.read();
            if table.closed {
                return Admission::Closed;
            }
            if !table.jobs.contains_key(name) {
                return Admission::Unknown;
            }
        }

        self.transition(name, |state| {
            if state.status.is_active() {
                (JobUpdate::default(), Admission::Busy(state.status))
            } else {
                (
                    JobUpdate::status(JobStatus::Pending).with_message(QUEUED_MESSAGE),
                    Admission::Admitted,
                )
            }
        })
        .unwrap_or(Admission::Closed)
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<JobChange> {
        self.inner.changes.subscribe()
    }

    /// Discard the registry: later updates are ignored and nothing more
    /// is published. Reads keep returning the last state.
    pub fn close(&self) {
        self.write().closed = true;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryTable> {
        self.inner.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RegistryTable> {
        self.inner.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}
