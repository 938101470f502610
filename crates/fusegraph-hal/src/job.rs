//! Photonic job records.
//!
//! A job moves `Queued → Running → {Completed, Failed, Cancelled}`. Once a
//! terminal state is reached the record no longer changes, so late status
//! reports from a remote platform cannot resurrect a finished job.
//!
//! Besides its status a record keeps what was learned from the run: the
//! number of detection events collected for a sampling task and the share
//! of generated outcomes that survived postselection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::ExecutionResult;
use crate::task::Task;

/// Backend-assigned job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting for the processor.
    Queued,
    /// Generating photons. `progress` is the fraction of the requested
    /// samples collected so far, when the platform reports it.
    Running { progress: Option<f64> },
    /// Finished; the result can be fetched.
    Completed,
    /// Finished without a result.
    Failed(String),
    /// Cancelled before finishing.
    Cancelled,
}

impl JobStatus {
    /// Running with unknown progress.
    pub fn running() -> Self {
        JobStatus::Running { progress: None }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }

    /// Check if the job completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "Queued"),
            JobStatus::Running { progress: None } => write!(f, "Running"),
            JobStatus::Running {
                progress: Some(p),
            } => write!(f, "Running ({:.0}%)", p * 100.0),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed(msg) => write!(f, "Failed: {msg}"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A submitted photonic job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Backend or platform the job runs on.
    pub backend: String,
    /// What the job computes.
    pub task: Task,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Detection events collected, for sampling tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<u64>,
    /// Probability mass that passed postselection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance: Option<f64>,
}

impl Job {
    /// Record a job that was just handed to `backend`.
    pub fn submitted(id: JobId, backend: impl Into<String>, task: Task) -> Self {
        Self {
            id,
            backend: backend.into(),
            task,
            status: JobStatus::Queued,
            submitted_at: Utc::now(),
            finished_at: None,
            samples: None,
            acceptance: None,
        }
    }

    /// Move to `status`. Returns `false` (and changes nothing) once the job
    /// is terminal.
    pub fn transition(&mut self, status: JobStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        if status.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        self.status = status;
        true
    }

    /// Mark the job completed and keep the sample count and acceptance of
    /// its result.
    pub fn complete(&mut self, result: &ExecutionResult) -> bool {
        if !self.transition(JobStatus::Completed) {
            return false;
        }
        self.samples = result.counts().map(|c| c.total_shots());
        self.acceptance = result.acceptance;
        true
    }

    /// Samples the task asked for, if it is a sampling task.
    pub fn requested_samples(&self) -> Option<u32> {
        self.task.shots()
    }
}
