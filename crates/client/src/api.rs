//! REST client for the dashboard API.
//!
//! Wraps the workflow/job/form/template REST endpoints using
//! [`reqwest`]: one method per endpoint the monitor layer consumes,
//! with shared success/JSON helpers and bearer-token auth.

use leadforge_core::{Artifact, ExecutionStep, Form, Job, Submission, Workflow};
use serde::Deserialize;

use crate::error::ApiError;

/// HTTP client for one dashboard API deployment.
pub struct DashboardApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Query for `GET /artifacts`.
#[derive(Debug, Clone)]
pub struct ArtifactQuery {
    pub job_id: String,
    /// Maximum number of artifacts to return. Server default applies
    /// when unset.
    pub limit: Option<u32>,
}

/// Response envelope for `GET /artifacts`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactPage {
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// Response returned by `POST /jobs/{id}/resubmit` after queueing a
/// fresh run of the same workflow and submission.
#[derive(Debug, Clone, Deserialize)]
pub struct ResubmitReceipt {
    /// Identifier of the NEW job.
    pub job_id: String,
}

impl DashboardApi {
    /// Create a client for a deployment.
    ///
    /// * `base_url` - API root, e.g. `https://api.example.com/v1`
    ///   (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for connection pooling across several API wrappers).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Attach a bearer token sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Fetch a job record by id.
    pub async fn get_job(&self, job_id: &str) -> Result<Job, ApiError> {
        let response = self.get(&format!("/jobs/{job_id}")).send().await?;
        Self::parse_response(response).await
    }

    /// Fetch a job's step-level execution trace.
    ///
    /// The trace is written to secondary storage after the job record
    /// exists, so this rejects with a not-found error until it
    /// materializes. A payload that is not a JSON array is a
    /// [`ApiError::Decode`] error, never a silent empty list.
    pub async fn get_execution_steps(&self, job_id: &str) -> Result<Vec<ExecutionStep>, ApiError> {
        let response = self
            .get(&format!("/jobs/{job_id}/execution-steps"))
            .send()
            .await?;
        let value: serde_json::Value = Self::parse_response(response).await?;
        if !value.is_array() {
            return Err(ApiError::Decode(
                "execution step trace is not an array".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| ApiError::Decode(format!("invalid execution step record: {e}")))
    }

    /// Fetch a workflow definition.
    pub async fn get_workflow(&self, workflow_id: &str) -> Result<Workflow, ApiError> {
        let response = self.get(&format!("/workflows/{workflow_id}")).send().await?;
        Self::parse_response(response).await
    }

    /// Fetch the submission that triggered a job.
    pub async fn get_submission(&self, submission_id: &str) -> Result<Submission, ApiError> {
        let response = self
            .get(&format!("/submissions/{submission_id}"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Fetch an intake form definition.
    pub async fn get_form(&self, form_id: &str) -> Result<Form, ApiError> {
        let response = self.get(&format!("/forms/{form_id}")).send().await?;
        Self::parse_response(response).await
    }

    /// List all artifacts produced by a job.
    pub async fn list_artifacts(&self, query: &ArtifactQuery) -> Result<ArtifactPage, ApiError> {
        let mut request = self.get("/artifacts").query(&[("job_id", &query.job_id)]);
        if let Some(limit) = query.limit {
            request = request.query(&[("limit", limit)]);
        }
        let response = request.send().await?;
        Self::parse_response(response).await
    }

    /// Queue a fresh run of the job's workflow against the same
    /// submission. Returns the new job's id.
    pub async fn resubmit_job(&self, job_id: &str) -> Result<ResubmitReceipt, ApiError> {
        let response = self
            .post(&format!("/jobs/{job_id}/resubmit"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Request a server-side rerun of one step (0-based index).
    ///
    /// With `continue_after` set, the server also re-executes every
    /// step following the target. The response body is
    /// deployment-specific and returned opaquely.
    pub async fn rerun_step(
        &self,
        job_id: &str,
        step_index: usize,
        continue_after: bool,
    ) -> Result<serde_json::Value, ApiError> {
        let body = serde_json::json!({ "continue_after": continue_after });
        let response = self
            .post(&format!("/jobs/{job_id}/steps/{step_index}/rerun"))
            .json(&body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::GET, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::POST, path)
    }

    /// Build a request with the correlation header and, when
    /// configured, the bearer token.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("x-request-id", uuid::Uuid::new_v4().to_string());
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    /// Ensure the response has a success status code. On failure,
    /// extract the best human-readable message from the error body.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_server_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            tracing::debug!(status = status.as_u16(), message = %message, "API request failed");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Pull a display message out of a JSON error body.
///
/// The API gateway and the older app server disagree on the field name,
/// so `message`, `error`, and `detail` are all accepted, first match
/// wins.
fn extract_server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["message", "error", "detail"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            if !text.trim().is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
