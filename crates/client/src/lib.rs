//! Typed HTTP client for the Leadforge dashboard REST API.
//!
//! Provides [`DashboardApi`], a [`reqwest`]-backed client covering the
//! job, workflow, submission, form, and artifact endpoints, and
//! [`JobsApi`], the object-safe trait the monitor layer consumes so
//! that tests can substitute a scripted implementation.

use async_trait::async_trait;
use leadforge_core::{ExecutionStep, Form, Job, Submission, Workflow};

pub mod api;
pub mod error;

pub use api::{ArtifactPage, ArtifactQuery, DashboardApi, ResubmitReceipt};
pub use error::{ApiError, DEFAULT_ERROR_MESSAGE};

/// The dashboard API surface the monitor layer depends on.
///
/// Implemented by [`DashboardApi`] for production and by scripted mocks
/// in tests. Every method may reject with an [`ApiError`] carrying the
/// HTTP status and the best available server message.
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// Fetch a job record by id.
    async fn get_job(&self, job_id: &str) -> Result<Job, ApiError>;

    /// Fetch a job's step-level execution trace. Rejects with a
    /// not-found error while the trace is unmaterialized.
    async fn get_execution_steps(&self, job_id: &str) -> Result<Vec<ExecutionStep>, ApiError>;

    /// Fetch a workflow definition.
    async fn get_workflow(&self, workflow_id: &str) -> Result<Workflow, ApiError>;

    /// Fetch the submission that triggered a job.
    async fn get_submission(&self, submission_id: &str) -> Result<Submission, ApiError>;

    /// Fetch an intake form definition.
    async fn get_form(&self, form_id: &str) -> Result<Form, ApiError>;

    /// List all artifacts produced by a job.
    async fn list_artifacts(&self, query: &ArtifactQuery) -> Result<ArtifactPage, ApiError>;

    /// Queue a fresh run of the job; returns the new job's id.
    async fn resubmit_job(&self, job_id: &str) -> Result<ResubmitReceipt, ApiError>;

    /// Request a server-side rerun of one step (0-based index).
    async fn rerun_step(
        &self,
        job_id: &str,
        step_index: usize,
        continue_after: bool,
    ) -> Result<serde_json::Value, ApiError>;
}

#[async_trait]
impl JobsApi for DashboardApi {
    async fn get_job(&self, job_id: &str) -> Result<Job, ApiError> {
        DashboardApi::get_job(self, job_id).await
    }

    async fn get_execution_steps(&self, job_id: &str) -> Result<Vec<ExecutionStep>, ApiError> {
        DashboardApi::get_execution_steps(self, job_id).await
    }

    async fn get_workflow(&self, workflow_id: &str) -> Result<Workflow, ApiError> {
        DashboardApi::get_workflow(self, workflow_id).await
    }

    async fn get_submission(&self, submission_id: &str) -> Result<Submission, ApiError> {
        DashboardApi::get_submission(self, submission_id).await
    }

    async fn get_form(&self, form_id: &str) -> Result<Form, ApiError> {
        DashboardApi::get_form(self, form_id).await
    }

    async fn list_artifacts(&self, query: &ArtifactQuery) -> Result<ArtifactPage, ApiError> {
        DashboardApi::list_artifacts(self, query).await
    }

    async fn resubmit_job(&self, job_id: &str) -> Result<ResubmitReceipt, ApiError> {
        DashboardApi::resubmit_job(self, job_id).await
    }

    async fn rerun_step(
        &self,
        job_id: &str,
        step_index: usize,
        continue_after: bool,
    ) -> Result<serde_json::Value, ApiError> {
        DashboardApi::rerun_step(self, job_id, step_index, continue_after).await
    }
}
