//! Error types for the Quandela adapter.

use fusegraph_hal::HalError;
use thiserror::Error;

/// Result type for Quandela operations.
pub type QuandelaResult<T> = Result<T, QuandelaError>;

/// Errors that can occur when talking to the Quandela cloud.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuandelaError {
    /// Missing API token.
    #[error("Missing Quandela token: set QUANDELA_TOKEN or pass a token in the backend config")]
    MissingToken,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job execution failed remotely.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// The platform cannot run the network.
    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),

    /// The result payload did not match the job's task.
    #[error("Malformed result: {0}")]
    MalformedResult(String),
}

impl From<QuandelaError> for HalError {
    fn from(e: QuandelaError) -> Self {
        match e {
            QuandelaError::MissingToken | QuandelaError::ApiError { status: 401 | 403, .. } => {
                HalError::AuthenticationFailed(e.to_string())
            }
            QuandelaError::JobNotFound(id) => HalError::JobNotFound(id),
            QuandelaError::JobFailed(msg) => HalError::JobFailed(msg),
            QuandelaError::Unsupported(msg) => HalError::Unsupported(msg),
            QuandelaError::Http(err) => HalError::Http(err),
            QuandelaError::Json(err) => HalError::Serialization(err),
            _ => HalError::Backend(e.to_string()),
        }
    }
}
