//! REST API client for the MBTA delay backend.
//!
//! Wraps the backend HTTP API (notebook submission, notebook status,
//! city and trip lookups) using [`reqwest`].

use std::time::Duration;

use mbta_core::{JobId, JobName};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::models::{CitiesResponse, StatusReport, SubmitReply, Trip, TripDetails, TripQuery};

/// HTTP client for a single backend instance.
#[derive(Debug, Clone)]
pub struct DashboardApi {
    client: reqwest::Client,
    base_url: String,
}

impl DashboardApi {
    /// Create a new API client.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Create an API client whose requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- notebook jobs ----

    /// Ask the backend to run a notebook.
    ///
    /// Sends `POST /api/run_notebook` with `{"name": <name>}`. A 2xx reply
    /// without a `job_id` is returned as-is; callers decide what that means.
    pub async fn run_notebook(&self, name: &JobName) -> Result<SubmitReply, ClientError> {
        let body = serde_json::json!({ "name": name });

        let response = self
            .client
            .post(self.url("/api/run_notebook"))
            .json(&body)
            .send()
            .await?;

        let raw: serde_json::Value = Self::parse_response(response).await?;
        Ok(SubmitReply::from_value(raw))
    }

    /// Query the status of one notebook run.
    ///
    /// Sends `GET /api/notebook_status?job_id=<id>`.
    pub async fn notebook_status(&self, job_id: &JobId) -> Result<StatusReport, ClientError> {
        let response = self
            .client
            .get(self.url("/api/notebook_status"))
            .query(&[("job_id", job_id.as_str())])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- trip data ----

    /// List the cities the backend has data for.
    pub async fn list_cities(&self) -> Result<Vec<String>, ClientError> {
        let response = self.client.get(self.url("/api/cities")).send().await?;
        let cities: CitiesResponse = Self::parse_response(response).await?;
        Ok(cities.cities)
    }

    /// List every trip row for `city`.
    pub async fn list_trips(&self, city: &str) -> Result<Vec<Trip>, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/api/{}/trips", city_segment(city))))
            .send()
            .await?;

        let trips: Option<Vec<Trip>> = Self::parse_response(response).await?;
        Ok(trips.unwrap_or_default())
    }

    /// Fetch the first trip row matching `query`, with weather columns.
    pub async fn trip_details(
        &self,
        city: &str,
        query: &TripQuery,
    ) -> Result<TripDetails, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/api/{}/trips/details", city_segment(city))))
            .query(query)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ClientError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    ///
    /// Bodies that are not valid JSON for `T` become [`ClientError::Decode`]
    /// rather than transport errors.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::debug!(error = %e, body = %text, "Undecodable backend response");
            ClientError::Decode(e.to_string())
        })
    }
}

/// Cities are addressed by their lowercase name, e.g. `/api/boston/trips`.
fn city_segment(city: &str) -> String {
    city.to_lowercase()
}
