//! View model for the notebook run panel.
//!
//! The panel is only offered for [`NOTEBOOK_CITY`]. It shows one button
//! per catalogued notebook; a button is disabled while its run is active
//! and shows the error detail once a run has failed.

use mbta_core::notebook::{self, NOTEBOOKS};
use mbta_core::{JobMessage, JobState, JobStatus};

pub use mbta_core::notebook::NOTEBOOK_CITY;

#[derive(Debug, Clone, PartialEq)]
pub struct NotebookButton {
    pub key: &'static str,
    pub label: &'static str,
    pub status: JobStatus,
    pub caption: &'static str,
    pub disabled: bool,
    /// Hover text: the latest message, else the label.
    pub title: String,
    /// Error detail shown under the button, only in `error`.
    pub error: Option<String>,
}

pub fn caption(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Idle => "Run notebook",
        JobStatus::Pending | JobStatus::Running => "Running...",
        JobStatus::Done => "Completed",
        JobStatus::Error => "Error",
    }
}

/// Text for a message: strings as-is, payloads as compact JSON.
pub fn render_message(message: &JobMessage) -> String {
    message.to_string()
}

/// Buttons for `city`, or `None` when the panel is hidden there.
///
/// Notebooks without an entry in `states` render as `idle`.
pub fn notebook_panel(city: &str, states: &[JobState]) -> Option<Vec<NotebookButton>> {
    if !notebook::panel_visible(city) {
        return None;
    }

    let buttons = NOTEBOOKS
        .iter()
        .map(|nb| {
            let state = states.iter().find(|s| s.name.as_str() == nb.key);
            let status = state.map(|s| s.status).unwrap_or(JobStatus::Idle);
            let message = state.and_then(|s| s.message.as_ref()).map(render_message);

            NotebookButton {
                key: nb.key,
                label: nb.label,
                status,
                caption: caption(status),
                disabled: status.is_active(),
                title: message.clone().unwrap_or_else(|| nb.label.to_string()),
                error: message.filter(|_| status == JobStatus::Error),
            }
        })
        .collect();
    Some(buttons)
}
