#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mbta_client::{ClientError, NotebookBackend, StatusReport, SubmitReply};
use mbta_core::{JobId, JobName};
use mbta_jobs::{JobSession, SessionConfig};
use tokio::sync::watch;

pub const INTERVAL: Duration = Duration::from_millis(2000);

pub fn main_1() -> JobName {
    JobName::from("main_1.ipynb")
}

pub fn main_2() -> JobName {
    JobName::from("main_2.ipynb")
}

/// Open a session over both catalogued notebooks with a 2s poll period.
pub fn open_session(backend: &Arc<ScriptedBackend>) -> JobSession {
    let backend: Arc<dyn NotebookBackend> = backend.clone();
    JobSession::open(
        backend,
        [main_1(), main_2()],
        SessionConfig {
            poll_interval: INTERVAL,
        },
    )
}

/// Let `n` poll periods elapse (plus a little slack) on the paused clock.
pub async fn run_ticks(n: u32) {
    tokio::time::sleep(INTERVAL * n + Duration::from_millis(100)).await;
}

pub fn api_error(status: u16, body: &str) -> ClientError {
    ClientError::ApiError {
        status,
        body: body.to_string(),
    }
}

/// In-memory backend with scripted replies.
///
/// Submissions without a scripted reply get a fresh random job id.
/// Status queries without a scripted reply report `running`.
/// Both kinds of request can be held open to simulate slow responses.
pub struct ScriptedBackend {
    submit_replies: Mutex<VecDeque<Result<SubmitReply, ClientError>>>,
    status_replies: Mutex<HashMap<JobId, VecDeque<Result<StatusReport, ClientError>>>>,
    submit_open: watch::Sender<bool>,
    poll_open: watch::Sender<bool>,
    submit_calls: AtomicUsize,
    poll_calls: Mutex<HashMap<JobId, usize>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            submit_replies: Mutex::new(VecDeque::new()),
            status_replies: Mutex::new(HashMap::new()),
            submit_open: watch::Sender::new(true),
            poll_open: watch::Sender::new(true),
            submit_calls: AtomicUsize::new(0),
            poll_calls: Mutex::new(HashMap::new()),
        })
    }

    // ---- scripting ----

    pub fn accept_next(&self, job_id: &str) {
        self.reply_to_submit(Ok(SubmitReply::from_value(
            serde_json::json!({ "job_id": job_id }),
        )));
    }

    pub fn reply_to_submit(&self, reply: Result<SubmitReply, ClientError>) {
        self.submit_replies.lock().unwrap().push_back(reply);
    }

    pub fn report(&self, job_id: &str, reply: Result<StatusReport, ClientError>) {
        self.status_replies
            .lock()
            .unwrap()
            .entry(JobId::from(job_id))
            .or_default()
            .push_back(reply);
    }

    pub fn report_status(&self, job_id: &str, status: &str) {
        self.report(job_id, Ok(StatusReport::with_status(status)));
    }

    pub fn hold_submissions(&self) {
        self.submit_open.send_replace(false);
    }

    pub fn release_submissions(&self) {
        self.submit_open.send_replace(true);
    }

    pub fn hold_polls(&self) {
        self.poll_open.send_replace(false);
    }

    pub fn release_polls(&self) {
        self.poll_open.send_replace(true);
    }

    // ---- inspection ----

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn poll_calls(&self, job_id: &str) -> usize {
        self.poll_calls
            .lock()
            .unwrap()
            .get(&JobId::from(job_id))
            .copied()
            .unwrap_or(0)
    }
}

async fn wait_open(gate: &watch::Sender<bool>) {
    let mut rx = gate.subscribe();
    let _ = rx.wait_for(|open| *open).await;
}

#[async_trait]
impl NotebookBackend for ScriptedBackend {
    async fn run_notebook(&self, _name: &JobName) -> Result<SubmitReply, ClientError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        wait_open(&self.submit_open).await;

        let scripted = self.submit_replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(SubmitReply::from_value(serde_json::json!({
                "job_id": uuid::Uuid::new_v4().to_string()
            })))
        })
    }

    async fn notebook_status(&self, job_id: &JobId) -> Result<StatusReport, ClientError> {
        *self
            .poll_calls
            .lock()
            .unwrap()
            .entry(job_id.clone())
            .or_default() += 1;
        wait_open(&self.poll_open).await;

        let scripted = self
            .status_replies
            .lock()
            .unwrap()
            .get_mut(job_id)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Ok(StatusReport::with_status("running")))
    }
}

/// Let every ready task run to its next await point.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
