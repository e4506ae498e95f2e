//! API Error Types
//!
//! Failures of a single REST call. None of them are retried; callers turn
//! them into a notification and return to their previous state.

use thiserror::Error;

/// REST client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Server could not be reached (connection refused, DNS failure)
    #[error("API unavailable at {0}")]
    Unavailable(String),

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Any other transport failure
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// Base URL or resource path could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Classify a transport error
    pub(crate) fn from_transport(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Unavailable(url.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Request(err)
        }
    }

    /// Whether the failure was a malformed payload rather than a transport problem
    pub fn is_decode(&self) -> bool {
        matches!(self, ApiError::Decode(_))
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
