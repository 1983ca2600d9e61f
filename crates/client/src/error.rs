//! Errors from the backend HTTP layer.

use mbta_core::JobMessage;
use serde_json::Value;

/// Generic detail used when a failed submission carries nothing better.
const SUBMIT_FALLBACK: &str = "request failed";

/// Generic detail used when a failed poll carries nothing better.
const POLL_FALLBACK: &str = "poll failed";

/// Errors from the backend REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response whose body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Most specific detail for a failed submission.
    ///
    /// Order: the body's `error` field, the whole body, the transport
    /// message, then a generic string.
    pub fn submission_detail(&self) -> JobMessage {
        if let Some(body) = self.body() {
            if let Some(error) = body.get("error").filter(|e| is_present(e)) {
                return JobMessage::from_payload(error.clone());
            }
            if is_present(&body) {
                return JobMessage::from_payload(body);
            }
        }
        self.transport_detail(SUBMIT_FALLBACK)
    }

    /// Most specific detail for a failed status poll.
    ///
    /// Order: the whole body, the transport message, then a generic string.
    pub fn poll_detail(&self) -> JobMessage {
        match self.body() {
            Some(body) if is_present(&body) => JobMessage::from_payload(body),
            _ => self.transport_detail(POLL_FALLBACK),
        }
    }

    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::ApiError { status, .. } => Some(*status),
            Self::Decode(_) => None,
        }
    }

    /// Error response body, parsed as JSON when possible.
    fn body(&self) -> Option<Value> {
        let Self::ApiError { body, .. } = self else {
            return None;
        };
        if body.trim().is_empty() {
            return None;
        }
        Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone())))
    }

    fn transport_detail(&self, fallback: &str) -> JobMessage {
        let message = match self {
            Self::Request(e) => e.to_string(),
            Self::ApiError { status, .. } => format!("Request failed with status code {status}"),
            Self::Decode(msg) => msg.clone(),
        };
        if message.is_empty() {
            JobMessage::text(fallback)
        } else {
            JobMessage::Text(message)
        }
    }
}

/// JSON values that count as "something to show".
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
