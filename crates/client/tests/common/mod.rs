use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Build a stub of the delay backend covering the endpoints the client uses.
///
/// Behaviour is keyed on the request values so each test can pick a path:
///
/// - `main_1.ipynb` is accepted with `job_id` `J1`.
/// - `no_id.ipynb` is accepted without a `job_id`.
/// - any other notebook is rejected with 403.
/// - `J1` reports `running`, `J2` reports via the legacy `state` field,
///   `garbled` returns a non-JSON body, anything else is a 404.
pub fn stub_backend() -> Router {
    Router::new()
        .route("/api/run_notebook", post(run_notebook))
        .route("/api/notebook_status", get(notebook_status))
        .route("/api/cities", get(cities))
        .route("/api/{city}/trips", get(trips))
        .route("/api/{city}/trips/details", get(trip_details))
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn run_notebook(Json(body): Json<Value>) -> Response {
    match body["name"].as_str() {
        Some("main_1.ipynb") => Json(json!({"job_id": "J1"})).into_response(),
        Some("no_id.ipynb") => Json(json!({"queued": true})).into_response(),
        Some(_) => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Notebook not allowed"})),
        )
            .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing notebook name"})),
        )
            .into_response(),
    }
}

async fn notebook_status(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("job_id").map(String::as_str) {
        Some("J1") => Json(json!({
            "name": "main_1.ipynb",
            "status": "running",
            "progress": 1,
            "message": "Executing notebook"
        }))
        .into_response(),
        Some("J2") => Json(json!({"state": "done"})).into_response(),
        Some("garbled") => "<html>oops</html>".into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"error": "Job not found"}))).into_response(),
    }
}

async fn cities() -> Json<Value> {
    Json(json!({"cities": ["Boston"]}))
}

async fn trips(Path(city): Path<String>) -> Response {
    if city != "boston" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Unknown city"}))).into_response();
    }
    Json(json!([
        {"vehicle_id": "G-10192", "vehicle_numeric_id": 10192, "trip_id": "T1",
         "stop_id": "70001", "latitude": 42.35, "longitude": -71.06, "total_delay_minutes": 4.5},
        {"vehicle_id": "1702", "vehicle_numeric_id": 1702, "trip_id": "T2",
         "stop_id": "70002", "latitude": null, "longitude": null, "total_delay_minutes": -1.0}
    ]))
    .into_response()
}

async fn trip_details(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("trip_id").map(String::as_str) != Some("T1") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No matching record found"})),
        )
            .into_response();
    }
    Json(json!({
        "trip_id": "T1",
        "vehicle_id": params.get("vehicle_id"),
        "vehicle_numeric_id": 10192,
        "stop_id": params.get("stop_id"),
        "latitude": 42.35,
        "longitude": -71.06,
        "temperature": 3.5,
        "humidity": 80,
        "precipitation": 0.4,
        "visibility": 9000.0,
        "weather_code": 61,
        "weather_description": "Slight rain",
        "total_delay_minutes": 4.5
    }))
    .into_response()
}
