//! Wire types for the backend's JSON responses.

use mbta_core::{JobId, JobMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Notebook jobs
// ---------------------------------------------------------------------------

/// Response to `POST /api/run_notebook`.
///
/// The raw payload is kept because a reply without a usable `job_id` is
/// surfaced to the user as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReply {
    /// Backend-assigned id, `None` when missing, empty, or not a string.
    pub job_id: Option<JobId>,
    pub raw: Value,
}

impl SubmitReply {
    pub fn from_value(raw: Value) -> Self {
        let job_id = raw
            .get("job_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(JobId::new);
        Self { job_id, raw }
    }
}

/// Response to `GET /api/notebook_status`.
///
/// The backend has used both `status` and `state` for the same field.
/// Everything else in the job record (progress, timestamps) is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub message: Option<JobMessage>,
}

impl StatusReport {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<JobMessage>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Trip data
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct CitiesResponse {
    #[serde(default)]
    pub cities: Vec<String>,
}

/// One row of `GET /api/{city}/trips`. Every column may be null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(default)]
    pub vehicle_id: Option<String>,
    /// Integer part of `vehicle_id` (e.g. `10192` for `G-10192`).
    #[serde(default)]
    pub vehicle_numeric_id: Option<i64>,
    #[serde(default)]
    pub trip_id: Option<String>,
    #[serde(default)]
    pub stop_id: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub total_delay_minutes: Option<f64>,
}

impl Trip {
    /// Query selecting this trip's detail row.
    pub fn details_query(&self) -> TripQuery {
        TripQuery {
            trip_id: self.trip_id.clone(),
            vehicle_id: self.vehicle_id.clone(),
            stop_id: self.stop_id.clone(),
        }
    }
}

/// Response of `GET /api/{city}/trips/details`: the trip plus weather.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripDetails {
    #[serde(flatten)]
    pub trip: Trip,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<i64>,
    #[serde(default)]
    pub precipitation: Option<f64>,
    #[serde(default)]
    pub visibility: Option<f64>,
    #[serde(default)]
    pub weather_code: Option<i64>,
    #[serde(default)]
    pub weather_description: Option<String>,
}

/// Filter for the trip detail lookup; absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TripQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_id: Option<String>,
}
