//! Error types for the HAL crate.

use thiserror::Error;

/// Errors raised while binding a backend or running a photonic job.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Missing or invalid backend configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The platform rejected the credentials.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The platform cannot run this kind of network or query.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The network or input state is malformed for this backend.
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    /// More modes or photons than the backend handles.
    #[error("Network too large: {0}")]
    NetworkTooLarge(String),

    /// A sampling task asked for zero samples or more than the backend allows.
    #[error("Cannot draw {requested} samples, allowed 1..={max}")]
    InvalidSampleCount {
        /// Samples requested.
        requested: u32,
        /// Backend limit.
        max: u32,
    },

    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The job ended without a result.
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Job cancelled")]
    JobCancelled,

    /// No terminal state was reached in time.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else a backend reports.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl HalError {
    /// Reject `requested` unless it lies in `1..=max`.
    pub fn check_samples(requested: u32, max: u32) -> HalResult<()> {
        if requested == 0 || requested > max {
            return Err(HalError::InvalidSampleCount { requested, max });
        }
        Ok(())
    }
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
