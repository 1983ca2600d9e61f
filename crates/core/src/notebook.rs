//! Catalogue of notebooks the backend is allowed to run.
//!
//! The backend rejects any name outside this set with a 403, so the
//! dashboard only ever tracks these keys.

use crate::error::CoreError;
use crate::job::JobName;

/// The only city for which the notebook panel is shown.
pub const NOTEBOOK_CITY: &str = "Boston";

/// A runnable notebook and its button label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notebook {
    /// File name sent to `POST /api/run_notebook`.
    pub key: &'static str,
    pub label: &'static str,
}

impl Notebook {
    pub fn job_name(&self) -> JobName {
        JobName::new(self.key)
    }
}

pub const NOTEBOOKS: [Notebook; 2] = [
    Notebook {
        key: "main_1.ipynb",
        label: "Schedule & Delay",
    },
    Notebook {
        key: "main_2.ipynb",
        label: "Total Delay",
    },
];

/// Job names for every catalogued notebook, in catalogue order.
pub fn job_names() -> Vec<JobName> {
    NOTEBOOKS.iter().map(Notebook::job_name).collect()
}

/// Look up a notebook by its key.
pub fn find(key: &str) -> Result<&'static Notebook, CoreError> {
    NOTEBOOKS
        .iter()
        .find(|n| n.key == key)
        .ok_or_else(|| CoreError::UnknownJob(key.to_string()))
}

/// Whether the notebook panel applies to `city`.
pub fn panel_visible(city: &str) -> bool {
    city == NOTEBOOK_CITY
}
