use std::time::Duration;

use reqwest::StatusCode;

/// Failures of a single fetch attempt or cache operation.
///
/// These never reach callers of [`crate::AirQualityService`]; the client logs
/// them and reports absence instead.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to parse response JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
