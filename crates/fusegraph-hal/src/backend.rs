//! Backend trait and configuration.
//!
//! The [`Backend`] trait defines the lifecycle for running a linear-optical
//! network:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `validate()` | async | provided | `HalResult<ValidationResult>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use fusegraph_ir::{InputState, Network};
use serde::{Deserialize, Serialize};

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;
use crate::task::Task;

/// Default interval between status polls in [`Backend::wait`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default upper bound on [`Backend::wait`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for a backend instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// API endpoint URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Authentication token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Job timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Additional configuration.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            token: None,
            timeout_secs: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the authentication token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the job timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    /// Add extra configuration.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Job timeout, falling back to [`DEFAULT_TIMEOUT`].
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("extra", &self.extra)
            .finish()
    }
}

/// Trait for photonic backends.
///
/// - `capabilities()` is synchronous and infallible; implementations cache
///   them at construction time.
/// - `submit()` returns a job that starts out `Queued`.
/// - `result()` is only valid once `status()` reports `Completed`.
/// - `wait()` polls every 500ms up to a 5-minute timeout by default.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// Check backend availability with queue depth information.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Validate a network and input state against backend constraints.
    async fn validate(&self, network: &Network, input: &InputState) -> HalResult<ValidationResult> {
        Ok(self.capabilities().check(network, input))
    }

    /// Submit a network for execution.
    async fn submit(&self, network: &Network, input: &InputState, task: &Task) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job to complete and return its result.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        wait_with(self, job_id, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT).await
    }

    /// Validate, submit and wait in one call.
    async fn run(&self, network: &Network, input: &InputState, task: &Task) -> HalResult<ExecutionResult> {
        match self.validate(network, input).await? {
            ValidationResult::Valid => {}
            ValidationResult::Invalid { reasons } => {
                return Err(HalError::InvalidNetwork(reasons.join("; ")));
            }
        }
        let job_id = self.submit(network, input, task).await?;
        self.wait(&job_id).await
    }
}

/// Poll `backend` until the job reaches a terminal state or `timeout` elapses.
pub async fn wait_with<B: Backend + ?Sized>(
    backend: &B,
    job_id: &JobId,
    poll_interval: Duration,
    timeout: Duration,
) -> HalResult<ExecutionResult> {
    let max_polls = (timeout.as_millis() / poll_interval.as_millis().max(1)).max(1);

    for _ in 0..max_polls {
        match backend.status(job_id).await? {
            JobStatus::Completed => return backend.result(job_id).await,
            JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
            JobStatus::Cancelled => return Err(HalError::JobCancelled),
            JobStatus::Queued | JobStatus::Running { .. } => {
                tokio::time::sleep(poll_interval).await;
            }
        }
    }

    Err(HalError::Timeout(job_id.0.clone()))
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Estimated wait time for a new job (if known).
    pub estimated_wait: Option<Duration>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability of a backend with no queue, such as a local simulator.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }

    /// Create availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Result of checking a network against backend constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Network can be submitted.
    Valid,
    /// Network cannot run on this backend.
    Invalid {
        /// Reasons the network is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check if the network can be submitted.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}
