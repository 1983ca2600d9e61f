//! Interpretation of status poll results.
//!
//! [`reduce`] is the pure transition table; [`StatusReducer`] applies it
//! to the registry atomically with deregistering the timer when the run
//! reaches a terminal status.
//!
//! | observed                 | next                     | timer    |
//! |--------------------------|--------------------------|----------|
//! | `done`                   | `done`                   | stop     |
//! | `error`                  | `error`                  | stop     |
//! | `pending` / `running`    | same                     | continue |
//! | anything else / missing  | `error`                  | stop     |
//! | transport failure        | `error`                  | stop     |
//!
//! Poll failures are terminal for the run: there is no automatic retry.

use mbta_client::{ClientError, StatusReport};
use mbta_core::{JobMessage, JobName, JobStatus, JobUpdate};

use crate::registry::JobRegistry;
use crate::scheduler::{Generation, PollScheduler};

/// Whether the timer that produced a result should keep ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDirective {
    Continue,
    Stop,
}

/// Why a poll ended the run in `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    /// The request failed or its body could not be decoded.
    TransportFailure,
    /// Neither `status` nor `state` was present.
    MalformedStatusResponse,
    /// A status value outside `pending | running | done | error`.
    UnrecognizedStatus(String),
}

/// Outcome of [`reduce`]: what to write and whether to keep polling.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub update: JobUpdate,
    pub directive: PollDirective,
    pub failure: Option<PollFailure>,
}

impl Reduction {
    /// Write nothing and stop.
    fn discard() -> Self {
        Self {
            update: JobUpdate::default(),
            directive: PollDirective::Stop,
            failure: None,
        }
    }

    fn failed(failure: PollFailure, message: JobMessage) -> Self {
        Self {
            update: JobUpdate::status(JobStatus::Error).with_message(message),
            directive: PollDirective::Stop,
            failure: Some(failure),
        }
    }
}

/// Status carried by a poll response.
///
/// `status` wins over `state`; empty strings count as absent. Returns
/// `None` when neither field is usable, which callers treat as `error`.
pub fn extract_status(report: &StatusReport) -> Option<&str> {
    report
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| report.state.as_deref().filter(|s| !s.is_empty()))
}

/// Transition for a job currently in `current` given one poll result.
///
/// Results for a job that is not pending/running are discarded.
pub fn reduce(current: JobStatus, result: &Result<StatusReport, ClientError>) -> Reduction {
    if !current.is_active() {
        return Reduction::discard();
    }

    let report = match result {
        Ok(report) => report,
        Err(e) => return Reduction::failed(PollFailure::TransportFailure, e.poll_detail()),
    };

    let message = report
        .message
        .clone()
        .filter(|m| m.as_text() != Some(""));

    let Some(observed) = extract_status(report) else {
        return Reduction::failed(
            PollFailure::MalformedStatusResponse,
            message.unwrap_or_else(|| JobMessage::text("Status response did not include a status")),
        );
    };

    // `idle` is never reported for a submitted run.
    let next = match observed.parse::<JobStatus>() {
        Ok(status) if status != JobStatus::Idle => status,
        _ => {
            return Reduction::failed(
                PollFailure::UnrecognizedStatus(observed.to_string()),
                message.unwrap_or_else(|| {
                    JobMessage::Text(format!("Unrecognized job status \"{observed}\""))
                }),
            );
        }
    };
    let directive = if next.is_terminal() {
        PollDirective::Stop
    } else {
        PollDirective::Continue
    };

    Reduction {
        update: JobUpdate::status(next).with_optional_message(message),
        directive,
        failure: None,
    }
}

/// Applies poll results for timers owned by one [`PollScheduler`].
#[derive(Clone)]
pub struct StatusReducer {
    registry: JobRegistry,
    scheduler: PollScheduler,
}

impl StatusReducer {
    pub fn new(registry: JobRegistry, scheduler: PollScheduler) -> Self {
        Self {
            registry,
            scheduler,
        }
    }

    /// Apply one tick's result for `name`.
    ///
    /// Results whose `generation` is no longer the live timer for `name`
    /// (replaced, stopped, torn down) are dropped without touching state.
    /// A terminal write deregisters the timer under the same lock, so no
    /// later tick for this timer can be observed.
    pub fn on_poll_result(
        &self,
        name: &JobName,
        generation: Generation,
        result: Result<StatusReport, ClientError>,
    ) -> PollDirective {
        let Some(lease) = self.scheduler.lease(name, generation) else {
            tracing::debug!(job = %name, generation, "Discarding stale poll result");
            return PollDirective::Stop;
        };

        let reduction = self
            .registry
            .transition(name, |state| {
                let reduction = reduce(state.status, &result);
                (reduction.update.clone(), reduction)
            })
            .unwrap_or_else(Reduction::discard);

        match (&reduction.failure, &result) {
            (Some(PollFailure::TransportFailure), Err(e)) => {
                tracing::warn!(job = %name, generation, error = %e, "Status poll failed");
            }
            (Some(failure), _) => {
                tracing::warn!(job = %name, generation, ?failure, "Unusable status response");
            }
            (None, _) => match reduction.update.status {
                Some(status) if status.is_terminal() => {
                    tracing::info!(job = %name, generation, %status, "Notebook run finished");
                }
                Some(status) => {
                    tracing::debug!(job = %name, generation, %status, "Notebook still in progress");
                }
                None => {}
            },
        }

        if reduction.directive == PollDirective::Stop {
            lease.release();
        }
        reduction.directive
    }
}
