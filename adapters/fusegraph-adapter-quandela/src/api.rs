//! Quandela cloud REST API client.
//!
//! Jobs are created with `POST /api/job`, polled with
//! `GET /api/job/status/{id}`, fetched with `GET /api/job/result/{id}` and
//! cancelled with `POST /api/job/cancel/{id}`. Platform details come from
//! `GET /api/platforms/{name}`.

// Response fields are deserialized for completeness even when unused.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{QuandelaError, QuandelaResult};

/// Quandela cloud API base URL.
pub const BASE_URL: &str = "https://api.cloud.quandela.com";

/// Quandela REST API client authenticated with a Bearer token.
pub struct QuandelaClient {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for QuandelaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuandelaClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl QuandelaClient {
    /// Create a client for the production endpoint.
    pub fn new(token: impl Into<String>) -> QuandelaResult<Self> {
        Self::with_base_url(BASE_URL, token)
    }

    /// Create a client targeting a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> QuandelaResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(QuandelaError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> QuandelaResult<String> {
        if self.token.is_empty() {
            return Err(QuandelaError::MissingToken);
        }
        Ok(format!("Bearer {}", self.token))
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> QuandelaResult<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header()?)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> QuandelaResult<T> {
        let url = self.url(path);
        debug!("POST {}", url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header()?)
            .json(body)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> QuandelaResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(QuandelaError::JobNotFound(message)),
            _ => Err(QuandelaError::ApiError {
                status: status.as_u16(),
                message,
            }),
        }
    }

    /// Fetch platform details.
    #[instrument(skip(self))]
    pub async fn platform(&self, name: &str) -> QuandelaResult<PlatformInfo> {
        self.get(&format!("api/platforms/{name}")).await
    }

    /// Create a job.
    #[instrument(skip(self, request), fields(platform = %request.platform_name))]
    pub async fn create_job(&self, request: &JobRequest) -> QuandelaResult<JobCreated> {
        self.post("api/job", request).await
    }

    /// Poll a job's status.
    #[instrument(skip(self))]
    pub async fn job_status(&self, job_id: &str) -> QuandelaResult<JobStatusResponse> {
        self.get(&format!("api/job/status/{job_id}")).await
    }

    /// Fetch a finished job's results.
    #[instrument(skip(self))]
    pub async fn job_result(&self, job_id: &str) -> QuandelaResult<JobResultResponse> {
        self.get(&format!("api/job/result/{job_id}")).await
    }

    /// Cancel a queued or running job.
    #[instrument(skip(self))]
    pub async fn cancel_job(&self, job_id: &str) -> QuandelaResult<()> {
        let _: serde_json::Value = self
            .post(&format!("api/job/cancel/{job_id}"), &serde_json::json!({}))
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Request / response serde types
// ---------------------------------------------------------------------------

/// Remote command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Exact output probabilities.
    Probs,
    /// Sampled counts.
    SampleCount,
}

/// Body of `POST /api/job`.
#[derive(Debug, Serialize)]
pub struct JobRequest {
    /// Target platform, e.g. `sim:belenos` or `qpu:belenos`.
    pub platform_name: String,
    /// Human-readable job name.
    pub job_name: String,
    /// What to run.
    pub payload: JobPayload,
}

/// Job payload.
#[derive(Debug, Serialize)]
pub struct JobPayload {
    /// Command to execute.
    pub command: Command,
    /// The serialized network.
    pub circuit: serde_json::Value,
    /// Input state label, e.g. `|{P:H},0>`.
    pub input_state: String,
    /// Postselection expression, e.g. `[0,1]==1 & [2]==0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postselect: Option<String>,
    /// Shot budget for sampling commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_shots: Option<u32>,
}

/// Response of `POST /api/job`.
#[derive(Debug, Deserialize)]
pub struct JobCreated {
    /// Assigned job identifier.
    pub job_id: String,
}

/// Response of `GET /api/job/status/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// `waiting | running | success | error | canceled`.
    pub status: String,
    /// Progress in `[0, 1]`.
    #[serde(default)]
    pub progress: Option<f64>,
    /// Message attached to failures.
    #[serde(default)]
    pub status_message: Option<String>,
}

impl JobStatusResponse {
    /// Whether the job is still pending.
    pub fn is_pending(&self) -> bool {
        matches!(self.status.to_lowercase().as_str(), "waiting" | "running")
    }

    /// Whether the job is running.
    pub fn is_running(&self) -> bool {
        self.status.eq_ignore_ascii_case("running")
    }

    /// Whether the job completed successfully.
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }

    /// Whether the job failed.
    pub fn is_error(&self) -> bool {
        self.status.eq_ignore_ascii_case("error")
    }

    /// Whether the job was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self.status.to_lowercase().as_str(),
            "canceled" | "cancelled" | "cancel_requested"
        )
    }
}

/// Response of `GET /api/job/result/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobResultResponse {
    /// Outcome label to probability or count.
    pub results: BTreeMap<String, f64>,
    /// Fraction of outcomes accepted by postselection.
    #[serde(default)]
    pub physical_perf: Option<f64>,
}

/// Response of `GET /api/platforms/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformInfo {
    /// Platform name.
    pub name: String,
    /// `available | maintenance | unavailable`.
    #[serde(default)]
    pub status: Option<String>,
    /// Platform type, `simulator` or `physical`.
    #[serde(rename = "type", default)]
    pub platform_type: Option<String>,
    /// Hardware limits.
    #[serde(default)]
    pub specs: Option<PlatformSpecs>,
    /// Jobs waiting on the platform.
    #[serde(default)]
    pub queue_size: Option<u32>,
}

/// Hardware limits of a platform.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSpecs {
    /// Maximum spatial modes.
    #[serde(default)]
    pub max_mode_count: Option<u32>,
    /// Maximum injected photons.
    #[serde(default)]
    pub max_photon_count: Option<u32>,
}

impl PlatformInfo {
    /// Whether the platform accepts jobs.
    pub fn is_available(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("available"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let client = QuandelaClient::with_base_url("http://localhost:8080/", "t").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/api/job"), "http://localhost:8080/api/job");
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = QuandelaClient::new("super-secret").unwrap();
        assert!(!format!("{client:?}").contains("super-secret"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let client = QuandelaClient::new("").unwrap();
        assert!(matches!(client.auth_header(), Err(QuandelaError::MissingToken)));
    }

    #[test]
    fn test_job_request_serialization() {
        let request = JobRequest {
            platform_name: "sim:belenos".into(),
            job_name: "fusegraph".into(),
            payload: JobPayload {
                command: Command::SampleCount,
                circuit: serde_json::json!({ "name": "c" }),
                input_state: "|{P:H},0>".into(),
                postselect: Some("[1]==1".into()),
                max_shots: Some(100),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["payload"]["command"], "sample_count");
        assert_eq!(json["payload"]["max_shots"], 100);
        assert_eq!(json["payload"]["postselect"], "[1]==1");
    }

    #[test]
    fn test_status_methods() {
        let mut status = JobStatusResponse {
            status: "waiting".into(),
            progress: None,
            status_message: None,
        };
        assert!(status.is_pending());
        assert!(!status.is_running());
        status.status = "RUNNING".into();
        assert!(status.is_running());
        status.status = "success".into();
        assert!(status.is_success());
        status.status = "canceled".into();
        assert!(status.is_cancelled());
        status.status = "error".into();
        assert!(status.is_error());
    }

    #[test]
    fn test_platform_deserialization() {
        let info: PlatformInfo = serde_json::from_value(serde_json::json!({
            "name": "qpu:belenos",
            "status": "available",
            "type": "physical",
            "specs": { "max_mode_count": 24, "max_photon_count": 6 },
            "queue_size": 3
        }))
        .unwrap();
        assert!(info.is_available());
        assert_eq!(info.specs.unwrap().max_mode_count, Some(24));
    }
}
