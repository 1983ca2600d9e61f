//! Notebook job model.
//!
//! One [`JobState`] exists per known job name for the lifetime of a
//! dashboard session. It is mutated only through [`JobUpdate`] merges,
//! which leave unspecified fields untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Catalogued identifier of a kind of backend computation, e.g. `main_1.ipynb`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Opaque identifier the backend assigns to one run of a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Client-side lifecycle of a job name.
///
/// `idle -> pending -> running -> done | error`. The only way back to an
/// early state is a fresh submission overwriting the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Idle,
    Pending,
    Running,
    Done,
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// A submission is in flight or the backend is still working on it.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// No further transitions or polling follow.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "done" => Ok(Self::Done),
            "error" => Ok(Self::Error),
            other => Err(CoreError::Validation(format!(
                "Unknown job status: \"{other}\""
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Last known human-readable detail for a job.
///
/// Error responses from the backend are kept verbatim when they are not
/// plain strings, so the view can still show something useful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobMessage {
    Text(String),
    Payload(serde_json::Value),
}

impl JobMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Wrap a raw JSON value, unwrapping bare strings into [`JobMessage::Text`].
    pub fn from_payload(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Payload(other),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Payload(_) => None,
        }
    }
}

impl fmt::Display for JobMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Payload(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for JobMessage {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for JobMessage {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// ---------------------------------------------------------------------------
// State + update
// ---------------------------------------------------------------------------

/// Tracked state for a single job name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobState {
    pub name: JobName,
    /// Set once a submission succeeds; replaced, never cleared, by later runs.
    pub job_id: Option<JobId>,
    pub status: JobStatus,
    pub message: Option<JobMessage>,
    pub updated_at: Timestamp,
}

impl JobState {
    /// Initial record for a job name that has never been submitted.
    pub fn idle(name: JobName) -> Self {
        Self {
            name,
            job_id: None,
            status: JobStatus::Idle,
            message: None,
            updated_at: chrono::Utc::now(),
        }
    }

    /// Shallow-merge `update` into this record.
    ///
    /// Returns `true` if any field changed. `updated_at` only moves when
    /// something did.
    pub fn apply(&mut self, update: JobUpdate) -> bool {
        let mut changed = false;

        if let Some(status) = update.status {
            changed |= self.status != status;
            self.status = status;
        }
        if let Some(job_id) = update.job_id {
            changed |= self.job_id.as_ref() != Some(&job_id);
            self.job_id = Some(job_id);
        }
        if let Some(message) = update.message {
            changed |= self.message != message;
            self.message = message;
        }

        if changed {
            self.updated_at = chrono::Utc::now();
        }
        changed
    }
}

/// Partial update for a [`JobState`]. `None` fields are preserved.
///
/// `message` is doubly optional: `Some(None)` clears the message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub job_id: Option<JobId>,
    pub message: Option<Option<JobMessage>>,
}

impl JobUpdate {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_job_id(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<JobMessage>) -> Self {
        self.message = Some(Some(message.into()));
        self
    }

    /// Replace the message, clearing it when `message` is `None`.
    pub fn with_optional_message(mut self, message: Option<JobMessage>) -> Self {
        self.message = Some(message);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.job_id.is_none() && self.message.is_none()
    }
}
