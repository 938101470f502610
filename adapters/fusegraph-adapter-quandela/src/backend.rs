//! Quandela cloud backend.

use std::sync::Arc;

use async_trait::async_trait;
use fusegraph_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    Distribution, ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, Task, TaskKind,
};
use fusegraph_ir::{InputState, Network};
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::api::{
    Command, JobPayload, JobRequest, JobResultResponse, JobStatusResponse, QuandelaClient,
};
use crate::error::{QuandelaError, QuandelaResult};

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "QUANDELA_TOKEN";

/// Platform used when the config does not name one.
pub const DEFAULT_PLATFORM: &str = "sim:belenos";

/// Cached jobs beyond this count have their terminal entries evicted.
const MAX_CACHED_JOBS: usize = 1024;

struct CachedJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Backend executing networks on a Quandela cloud platform.
///
/// The platform is taken from the `platform` entry of the backend config
/// (default [`DEFAULT_PLATFORM`]). The token comes from the config or from
/// `QUANDELA_TOKEN`.
pub struct QuandelaBackend {
    config: BackendConfig,
    platform: String,
    capabilities: Capabilities,
    client: QuandelaClient,
    jobs: Arc<Mutex<FxHashMap<String, CachedJob>>>,
}

impl std::fmt::Debug for QuandelaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuandelaBackend")
            .field("name", &self.config.name)
            .field("platform", &self.platform)
            .field("client", &self.client)
            .finish()
    }
}

impl QuandelaBackend {
    /// Create a backend for `platform` using `QUANDELA_TOKEN`.
    pub fn new(platform: impl Into<String>) -> QuandelaResult<Self> {
        let token = std::env::var(TOKEN_ENV).unwrap_or_default();
        Self::with_token(platform, token)
    }

    /// Create a backend with an explicit token.
    pub fn with_token(platform: impl Into<String>, token: impl Into<String>) -> QuandelaResult<Self> {
        let platform = platform.into();
        let config = BackendConfig::new("quandela").with_extra("platform", platform.clone().into());
        Self::build(config, platform, QuandelaClient::new(token)?)
    }

    fn build(config: BackendConfig, platform: String, client: QuandelaClient) -> QuandelaResult<Self> {
        Ok(Self {
            capabilities: Capabilities::quandela(platform.clone()),
            config,
            platform,
            client,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
        })
    }

    fn from_config_impl(config: BackendConfig) -> QuandelaResult<Self> {
        let token = config
            .token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .unwrap_or_default();
        let platform = config
            .extra
            .get("platform")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(DEFAULT_PLATFORM)
            .to_string();
        let client = match &config.endpoint {
            Some(endpoint) => QuandelaClient::with_base_url(endpoint.clone(), token)?,
            None => QuandelaClient::new(token)?,
        };
        Self::build(config, platform, client)
    }

    /// Target platform name.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    fn job_request(&self, network: &Network, input: &InputState, task: &Task) -> QuandelaResult<JobRequest> {
        let command = match task.kind {
            TaskKind::Probabilities if !self.capabilities.supports_probabilities => {
                return Err(QuandelaError::Unsupported(format!(
                    "{} only supports sampling",
                    self.platform
                )));
            }
            TaskKind::Probabilities => Command::Probs,
            TaskKind::Samples { .. } => Command::SampleCount,
        };
        Ok(JobRequest {
            platform_name: self.platform.clone(),
            job_name: format!("fusegraph-{}-{}", network.name(), Uuid::new_v4().simple()),
            payload: JobPayload {
                command,
                circuit: serde_json::to_value(network)?,
                input_state: input.to_string(),
                postselect: task
                    .postselect
                    .as_ref()
                    .filter(|ps| !ps.is_empty())
                    .map(ToString::to_string),
                max_shots: task.shots(),
            },
        })
    }
}

/// Map a remote status onto the job state machine.
fn map_status(response: &JobStatusResponse) -> JobStatus {
    if response.is_success() {
        JobStatus::Completed
    } else if response.is_error() {
        JobStatus::Failed(response.status_message.clone().unwrap_or_default())
    } else if response.is_cancelled() {
        JobStatus::Cancelled
    } else if response.is_running() {
        JobStatus::Running {
            progress: response.progress,
        }
    } else {
        JobStatus::Queued
    }
}

/// Convert a remote result according to the task that produced it.
fn convert_result(response: JobResultResponse, kind: TaskKind) -> QuandelaResult<ExecutionResult> {
    let result = match kind {
        TaskKind::Probabilities => {
            let mut dist = Distribution::new();
            for (outcome, p) in response.results {
                dist.insert(outcome, p);
            }
            ExecutionResult::probabilities(dist)
        }
        TaskKind::Samples { .. } => {
            let mut counts = Counts::new();
            for (outcome, n) in response.results {
                if n < 0.0 || n.fract() != 0.0 {
                    return Err(QuandelaError::MalformedResult(format!(
                        "count {n} for {outcome} is not a whole number"
                    )));
                }
                counts.insert(outcome, n as u64);
            }
            ExecutionResult::samples(counts)
        }
    };
    Ok(match response.physical_perf {
        Some(perf) => result.with_acceptance(perf),
        None => result,
    })
}

#[async_trait]
impl Backend for QuandelaBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[instrument(skip(self))]
    async fn availability(&self) -> HalResult<BackendAvailability> {
        let info = self.client.platform(&self.platform).await?;
        if info.is_available() {
            Ok(BackendAvailability {
                is_available: true,
                queue_depth: info.queue_size,
                estimated_wait: None,
                status_message: info.status,
            })
        } else {
            Ok(BackendAvailability::unavailable(
                info.status.unwrap_or_else(|| "unknown".into()),
            ))
        }
    }

    #[instrument(skip(self, network, input))]
    async fn submit(&self, network: &Network, input: &InputState, task: &Task) -> HalResult<JobId> {
        if let Some(shots) = task.shots() {
            HalError::check_samples(shots, self.capabilities.max_shots)?;
        }
        let request = self.job_request(network, input, task)?;
        let created = self.client.create_job(&request).await?;
        let job_id = JobId::new(created.job_id);
        debug!("Submitted job {} to {}", job_id, self.platform);

        let job = Job::submitted(job_id.clone(), self.platform.clone(), task.clone());
        let mut jobs = self.jobs.lock().await;
        if jobs.len() >= MAX_CACHED_JOBS {
            jobs.retain(|_, j| !j.job.status.is_terminal());
        }
        jobs.insert(job_id.0.clone(), CachedJob { job, result: None });
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let response = self.client.job_status(&job_id.0).await.map_err(|e| match e {
            QuandelaError::JobNotFound(_) => HalError::JobNotFound(job_id.0.clone()),
            other => other.into(),
        })?;
        let status = map_status(&response);
        if let Some(cached) = self.jobs.lock().await.get_mut(&job_id.0) {
            cached.job.transition(status.clone());
        }
        Ok(status)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let kind = {
            let jobs = self.jobs.lock().await;
            match jobs.get(&job_id.0) {
                Some(CachedJob {
                    result: Some(result),
                    ..
                }) => return Ok(result.clone()),
                Some(cached) => cached.job.task.kind,
                None => {
                    warn!("Job {} was not submitted here, reading it as probabilities", job_id);
                    TaskKind::Probabilities
                }
            }
        };

        let response = self.client.job_result(&job_id.0).await?;
        let result = convert_result(response, kind)?;
        if let Some(cached) = self.jobs.lock().await.get_mut(&job_id.0) {
            cached.job.complete(&result);
            cached.result = Some(result.clone());
        }
        Ok(result)
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client.cancel_job(&job_id.0).await?;
        if let Some(cached) = self.jobs.lock().await.get_mut(&job_id.0) {
            cached.job.transition(JobStatus::Cancelled);
        }
        Ok(())
    }
}

impl BackendFactory for QuandelaBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        Self::from_config_impl(config).map_err(HalError::from)
    }
}
