//! The seam between job orchestration and the backend job runner.

use async_trait::async_trait;
use mbta_core::{JobId, JobName};

use crate::api::DashboardApi;
use crate::error::ClientError;
use crate::models::{StatusReport, SubmitReply};

/// Fire-and-forget submission plus a separate status query.
///
/// There is no push channel; callers poll [`notebook_status`](Self::notebook_status).
#[async_trait]
pub trait NotebookBackend: Send + Sync {
    async fn run_notebook(&self, name: &JobName) -> Result<SubmitReply, ClientError>;

    async fn notebook_status(&self, job_id: &JobId) -> Result<StatusReport, ClientError>;
}

#[async_trait]
impl NotebookBackend for DashboardApi {
    async fn run_notebook(&self, name: &JobName) -> Result<SubmitReply, ClientError> {
        DashboardApi::run_notebook(self, name).await
    }

    async fn notebook_status(&self, job_id: &JobId) -> Result<StatusReport, ClientError> {
        DashboardApi::notebook_status(self, job_id).await
    }
}
