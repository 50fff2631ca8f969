//! Job and execution-step models for workflow runs.
//!
//! A [`Job`] is one execution of a workflow against a submission. Its
//! step-level trace ([`ExecutionStep`]) is written to secondary storage
//! after the job record exists, so `execution_steps` is lazily
//! populated by the monitor layer rather than arriving with the job.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Route parameter emitted by the static-export fallback page. Never a
/// real job id; requests for it must be short-circuited.
pub const JOB_ID_SENTINEL: &str = "__id__";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a workflow run.
///
/// The server owns transitions; the client never writes `status` back,
/// with one documented exception: the optimistic `Completed` ->
/// `Processing` flip immediately after a step rerun is requested
/// (local-only, overwritten by the next successful poll).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// True once the server will no longer change this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// One workflow run as returned by `GET /jobs/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub submission_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
    #[serde(default)]
    pub output_url: Option<String>,
    /// Pointer to where the step trace is persisted out-of-band.
    /// Carried only for diagnostics; never dereferenced client-side.
    #[serde(default)]
    pub execution_steps_s3_key: Option<String>,
    /// Step trace, populated lazily by the execution-step reconciler.
    #[serde(default)]
    pub execution_steps: Option<Vec<ExecutionStep>>,
}

impl Job {
    /// The step trace, or an empty slice while it is unloaded.
    pub fn steps(&self) -> &[ExecutionStep] {
        self.execution_steps.as_deref().unwrap_or(&[])
    }
}

/// One step's execution record within a job run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    /// 1-based position, matching workflow step index + 1.
    pub step_order: u32,
    #[serde(default)]
    pub started_at: Option<Timestamp>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionStep {
    /// True once the step has produced output or failed. A pending or
    /// in-progress step carries an absent or empty `output`.
    pub fn is_settled(&self) -> bool {
        let has_output = self.output.as_deref().is_some_and(|s| !s.is_empty());
        let has_error = self.error.as_deref().is_some_and(|s| !s.is_empty());
        has_output || has_error
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a job id before any request is issued.
///
/// Rejects empty and whitespace-only ids, and the [`JOB_ID_SENTINEL`]
/// the static-export fallback route substitutes for a missing path
/// parameter.
pub fn validate_job_id(job_id: &str) -> Result<(), CoreError> {
    let trimmed = job_id.trim();
    if trimmed.is_empty() || trimmed == JOB_ID_SENTINEL {
        return Err(CoreError::Validation("Invalid job ID".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
