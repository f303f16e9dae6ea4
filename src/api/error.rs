//! The normalized error returned by every pipeline call.

use serde_json::Value;

/// Message of every [`ApiError::Parse`] raised for a response body
pub const PARSE_ERROR_MESSAGE: &str = "Failed to parse response as JSON";

/// Error produced by the request pipeline.
///
/// Every variant carries a single message string; callers that only need
/// something to show the user can rely on [`ApiError::message`] or `Display`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-success status
    #[error("{0}")]
    Request(String),

    /// The request never produced a response (connect, DNS, timeout)
    #[error("{0}")]
    Transport(String),

    /// A response or stored value could not be parsed
    #[error("{0}")]
    Parse(String),

    /// The request could not be built (bad header value, bad URL)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The credential store could not be read
    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// The message carried by this error, without any prefix
    pub fn message(&self) -> &str {
        match self {
            ApiError::Request(msg)
            | ApiError::Transport(msg)
            | ApiError::Parse(msg)
            | ApiError::InvalidRequest(msg)
            | ApiError::Storage(msg) => msg,
        }
    }

    /// Build the error for a non-success response.
    ///
    /// `reason` is the status text the server sent, if any, and `body` is the
    /// raw response text. The backend's `detail` field wins when it is present
    /// and truthy; a body that is not JSON, or has no usable `detail`, falls
    /// back to the status line.
    pub fn from_status(status: reqwest::StatusCode, reason: Option<&str>, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| json.get("detail").and_then(detail_message));

        ApiError::Request(detail.unwrap_or_else(|| status_line(status, reason)))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!("Response JSON decode failed: {}", err);
        ApiError::Parse(PARSE_ERROR_MESSAGE.to_string())
    }
}

/// `HTTP 500: Upstream Broke`; the canonical reason stands in when the server
/// sent none.
fn status_line(status: reqwest::StatusCode, reason: Option<&str>) -> String {
    match reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .or_else(|| status.canonical_reason())
    {
        Some(reason) => format!("HTTP {}: {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}

// Falsy JSON values (null, false, 0, "") do not count as a message.
fn detail_message(detail: &Value) -> Option<String> {
    match detail {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
