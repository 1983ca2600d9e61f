//! One-shot notebook submission.
//!
//! [`Launcher::submit`] guards against a second concurrent run for the
//! same job name, marks the job `pending` before any network round trip,
//! submits it, and on success hands the new run to the
//! [`PollScheduler`]. Failures are recorded on the job's own record and
//! never returned as errors; nothing is retried.

use std::sync::Arc;

use mbta_client::NotebookBackend;
use mbta_core::{JobId, JobMessage, JobName, JobStatus, JobUpdate};

use crate::registry::{Admission, JobRegistry};
use crate::scheduler::PollScheduler;

/// Message shown once the backend has accepted a run.
const STARTED_MESSAGE: &str = "Started";

/// Message used when a reply without a job id has no usable body either.
const NO_JOB_ID_MESSAGE: &str = "no job_id returned";

/// What a call to [`Launcher::submit`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Accepted; polling has started for this run.
    Started(JobId),
    /// A run was already pending or running for this name. Nothing changed.
    DuplicateSubmissionIgnored(JobStatus),
    /// The backend answered but gave no usable job id.
    SubmissionRejected(JobMessage),
    /// The request failed or the backend returned an error status.
    TransportFailure(JobMessage),
    /// The name is not one of the registry's job names.
    UnknownJob,
    /// The owning session was torn down before the run could start.
    SessionClosed,
}

impl SubmitOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

#[derive(Clone)]
pub struct Launcher {
    registry: JobRegistry,
    scheduler: PollScheduler,
    backend: Arc<dyn NotebookBackend>,
}

impl Launcher {
    pub fn new(
        registry: JobRegistry,
        scheduler: PollScheduler,
        backend: Arc<dyn NotebookBackend>,
    ) -> Self {
        Self {
            registry,
            scheduler,
            backend,
        }
    }

    /// Submit a run of `name`.
    ///
    /// No-op while a run for `name` is pending or running. Submissions for
    /// different names are independent and may overlap.
    pub async fn submit(&self, name: &JobName) -> SubmitOutcome {
        match self.registry.begin_submission(name) {
            Admission::Admitted => {}
            Admission::Busy(status) => {
                tracing::debug!(job = %name, %status, "Run already active, ignoring submission");
                return SubmitOutcome::DuplicateSubmissionIgnored(status);
            }
            Admission::Unknown => {
                tracing::warn!(job = %name, "Submission for unknown job");
                return SubmitOutcome::UnknownJob;
            }
            Admission::Closed => return SubmitOutcome::SessionClosed,
        }

        tracing::info!(job = %name, "Submitting notebook");

        let reply = match self.backend.run_notebook(name).await {
            Ok(reply) => reply,
            Err(e) => {
                let message = e.submission_detail();
                tracing::error!(
                    job = %name,
                    http_status = ?e.status(),
                    error = %e,
                    "Notebook submission failed",
                );
                if !self.fail(name, message.clone()) {
                    return SubmitOutcome::SessionClosed;
                }
                return SubmitOutcome::TransportFailure(message);
            }
        };

        let Some(job_id) = reply.job_id else {
            let message = rejection_message(reply.raw);
            tracing::warn!(job = %name, response = %message, "Backend returned no job id");
            if !self.fail(name, message.clone()) {
                return SubmitOutcome::SessionClosed;
            }
            return SubmitOutcome::SubmissionRejected(message);
        };

        let started = self.registry.set(
            name,
            JobUpdate::status(JobStatus::Running)
                .with_job_id(job_id.clone())
                .with_message(STARTED_MESSAGE),
        );
        if !started || self.scheduler.start(name, job_id.clone()).is_none() {
            tracing::info!(job = %name, job_id = %job_id, "Session closed while submitting, not polling");
            return SubmitOutcome::SessionClosed;
        }

        tracing::info!(job = %name, job_id = %job_id, "Notebook run started");
        SubmitOutcome::Started(job_id)
    }

    /// Record a failed submission. `false` once the registry is closed.
    fn fail(&self, name: &JobName, message: JobMessage) -> bool {
        let recorded = self
            .registry
            .set(name, JobUpdate::status(JobStatus::Error).with_message(message));
        if !recorded {
            tracing::info!(job = %name, "Session closed while submitting, failure not recorded");
        }
        recorded
    }
}

/// The raw reply is the most useful thing to show, unless it is empty.
fn rejection_message(raw: serde_json::Value) -> JobMessage {
    match raw {
        serde_json::Value::Null => JobMessage::text(NO_JOB_ID_MESSAGE),
        serde_json::Value::String(s) if s.is_empty() => JobMessage::text(NO_JOB_ID_MESSAGE),
        other => JobMessage::from_payload(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_keeps_raw_payload() {
        assert_eq!(
            rejection_message(serde_json::json!({"queued": true})),
            JobMessage::Payload(serde_json::json!({"queued": true}))
        );
    }

    #[test]
    fn empty_rejection_uses_fallback() {
        assert_eq!(
            rejection_message(serde_json::Value::Null),
            JobMessage::text(NO_JOB_ID_MESSAGE)
        );
        assert_eq!(
            rejection_message(serde_json::json!("")),
            JobMessage::text(NO_JOB_ID_MESSAGE)
        );
    }
}
