//! One pass of the dashboard: pick a city, summarise its trips, and run
//! the requested notebooks to completion.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use mbta_client::{ClientError, DashboardApi, NotebookBackend};
use mbta_core::notebook::{self, Notebook};
use mbta_core::{CoreError, JobName, JobState, JobStatus};
use mbta_jobs::{JobChange, JobSession, SessionConfig, SubmitOutcome};
use tokio::sync::broadcast::error::RecvError;

use crate::cities;
use crate::config::DashboardConfig;
use crate::panel::{self, NotebookButton};
use crate::trips::{DelayClass, TripSummary};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// What one run showed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardReport {
    /// Selected city, `None` when the backend lists none.
    pub city: Option<String>,
    pub summary: TripSummary,
    /// Final notebook panel, `None` when hidden for the city.
    pub panel: Option<Vec<NotebookButton>>,
}

pub async fn run(config: DashboardConfig) -> Result<DashboardReport, DashboardError> {
    let api = DashboardApi::with_timeout(config.backend_url.clone(), config.request_timeout)?;

    let available = api.list_cities().await?;
    let Some(city) = cities::select_city(&available, config.city.as_deref()) else {
        tracing::warn!("Backend lists no cities");
        return Ok(DashboardReport::default());
    };
    tracing::info!(city = %city, available = available.len(), "City selected");

    let trips = api.list_trips(&city).await?;
    let summary = TripSummary::from_trips(&trips);
    let delayed = trips
        .iter()
        .filter(|t| DelayClass::of(t) == DelayClass::Delayed)
        .count();
    tracing::info!(
        city = %city,
        total = summary.total,
        delayed,
        on_time = summary.on_time,
        on_time_percent = summary.on_time_percent,
        avg_delay_minutes = summary.avg_delay,
        "Trip summary",
    );

    if !notebook::panel_visible(&city) {
        tracing::debug!(city = %city, "Notebook panel not offered for city");
        return Ok(DashboardReport {
            city: Some(city),
            summary,
            panel: None,
        });
    }

    let requested = config
        .run_notebooks
        .iter()
        .map(|key| notebook::find(key).map(Notebook::job_name))
        .collect::<Result<Vec<_>, _>>()?;

    let backend: Arc<dyn NotebookBackend> = Arc::new(api);
    let session = JobSession::open(
        backend,
        notebook::job_names(),
        SessionConfig {
            poll_interval: config.poll_interval,
        },
    );

    run_notebooks(&session, &requested).await;

    let panel = panel::notebook_panel(&city, &session.registry().snapshot());
    session.teardown();

    Ok(DashboardReport {
        city: Some(city),
        summary,
        panel,
    })
}

/// Submit `names` together and follow their runs until each is terminal
/// or the process is interrupted.
async fn run_notebooks(session: &JobSession, names: &[JobName]) {
    if names.is_empty() {
        return;
    }

    let mut changes = session.subscribe();
    let outcomes = join_all(names.iter().map(|name| session.submit(name))).await;

    let mut waiting = HashSet::new();
    for (name, outcome) in names.iter().zip(outcomes) {
        match outcome {
            SubmitOutcome::Started(_) => {
                waiting.insert(name.clone());
            }
            other => tracing::warn!(job = %name, outcome = ?other, "Notebook not started"),
        }
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while !waiting.is_empty() {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                tracing::info!(unfinished = waiting.len(), "Interrupted, abandoning notebook runs");
                break;
            }
            change = changes.recv() => match change {
                Ok(JobChange { name, state }) => {
                    log_change(&state);
                    if state.status.is_terminal() {
                        waiting.remove(&name);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Missed job updates, resyncing");
                    waiting.retain(|name| {
                        session.state(name).is_some_and(|s| s.status.is_active())
                    });
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

fn log_change(state: &JobState) {
    let message = state.message.as_ref().map(panel::render_message);
    let job_id = state.job_id.as_ref().map(|id| id.as_str()).unwrap_or("-");
    match state.status {
        JobStatus::Error => tracing::warn!(
            job = %state.name,
            job_id,
            message = message.as_deref().unwrap_or(""),
            "Notebook run failed",
        ),
        status => tracing::info!(
            job = %state.name,
            job_id,
            %status,
            caption = panel::caption(status),
            message = message.as_deref().unwrap_or(""),
            "Notebook job updated",
        ),
    }
}
