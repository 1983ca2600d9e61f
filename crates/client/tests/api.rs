//! Integration tests for `DashboardApi` against an in-process stub backend.

mod common;

use assert_matches::assert_matches;
use mbta_client::{ClientError, DashboardApi, NotebookBackend, TripQuery};
use mbta_core::{JobId, JobMessage, JobName};

async fn api() -> DashboardApi {
    let base_url = common::spawn(common::stub_backend()).await;
    DashboardApi::new(base_url)
}

// ---------------------------------------------------------------------------
// Notebook submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_notebook_returns_job_id() {
    let api = api().await;

    let reply = api.run_notebook(&JobName::from("main_1.ipynb")).await.unwrap();

    assert_eq!(reply.job_id, Some(JobId::from("J1")));
    assert_eq!(reply.raw["job_id"], "J1");
}

#[tokio::test]
async fn run_notebook_without_job_id_keeps_raw_payload() {
    let api = api().await;

    let reply = api.run_notebook(&JobName::from("no_id.ipynb")).await.unwrap();

    assert!(reply.job_id.is_none());
    assert_eq!(reply.raw, serde_json::json!({"queued": true}));
}

#[tokio::test]
async fn rejected_notebook_surfaces_error_field() {
    let api = api().await;

    let err = api
        .run_notebook(&JobName::from("evil.ipynb"))
        .await
        .unwrap_err();

    assert_matches!(err, ClientError::ApiError { status: 403, .. });
    assert_eq!(err.submission_detail(), JobMessage::text("Notebook not allowed"));
}

// ---------------------------------------------------------------------------
// Status polling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notebook_status_reads_status_and_message() {
    let api = api().await;

    let report = api.notebook_status(&JobId::from("J1")).await.unwrap();

    assert_eq!(report.status.as_deref(), Some("running"));
    assert_eq!(report.message, Some(JobMessage::text("Executing notebook")));
}

#[tokio::test]
async fn notebook_status_reads_legacy_state_field() {
    let api = api().await;

    let report = api.notebook_status(&JobId::from("J2")).await.unwrap();

    assert!(report.status.is_none());
    assert_eq!(report.state.as_deref(), Some("done"));
}

#[tokio::test]
async fn unknown_job_is_api_error() {
    let api = api().await;

    let err = api.notebook_status(&JobId::from("nope")).await.unwrap_err();

    assert_matches!(err, ClientError::ApiError { status: 404, .. });
    assert_eq!(
        err.poll_detail(),
        JobMessage::Payload(serde_json::json!({"error": "Job not found"}))
    );
}

#[tokio::test]
async fn non_json_status_is_decode_error() {
    let api = api().await;

    let err = api.notebook_status(&JobId::from("garbled")).await.unwrap_err();

    assert_matches!(err, ClientError::Decode(_));
}

#[tokio::test]
async fn unreachable_backend_is_request_error() {
    // Bind and drop a listener so the port is very likely closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = DashboardApi::new(format!("http://{addr}"));

    let err = api.notebook_status(&JobId::from("J1")).await.unwrap_err();

    assert_matches!(err, ClientError::Request(_));
    assert!(err.poll_detail().as_text().is_some());
}

#[tokio::test]
async fn trait_object_delegates_to_http_client() {
    let api = api().await;
    let backend: &dyn NotebookBackend = &api;

    let reply = backend
        .run_notebook(&JobName::from("main_1.ipynb"))
        .await
        .unwrap();

    assert_eq!(reply.job_id, Some(JobId::from("J1")));
}

// ---------------------------------------------------------------------------
// Trip data
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_cities() {
    let api = api().await;
    assert_eq!(api.list_cities().await.unwrap(), vec!["Boston".to_string()]);
}

#[tokio::test]
async fn list_trips_uses_lowercase_city() {
    let api = api().await;

    let trips = api.list_trips("Boston").await.unwrap();

    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].trip_id.as_deref(), Some("T1"));
    assert!(trips[1].latitude.is_none());
}

#[tokio::test]
async fn trip_details_sends_query_params() {
    let api = api().await;
    let query = TripQuery {
        trip_id: Some("T1".into()),
        vehicle_id: Some("G-10192".into()),
        stop_id: Some("70001".into()),
    };

    let details = api.trip_details("Boston", &query).await.unwrap();

    assert_eq!(details.trip.vehicle_id.as_deref(), Some("G-10192"));
    assert_eq!(details.trip.stop_id.as_deref(), Some("70001"));
    assert_eq!(details.weather_code, Some(61));
}

#[tokio::test]
async fn missing_trip_details_is_not_found() {
    let api = api().await;

    let err = api
        .trip_details("Boston", &TripQuery::default())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
}
