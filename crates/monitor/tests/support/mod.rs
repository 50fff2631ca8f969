//! Shared test support: a scripted [`JobsApi`] implementation with
//! per-endpoint call counters, plus small record builders.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadforge_client::{ApiError, ArtifactPage, ArtifactQuery, JobsApi, ResubmitReceipt};
use leadforge_core::{Artifact, ExecutionStep, Form, Job, JobStatus, Submission, Workflow};
use parking_lot::Mutex;

/// One scripted response. Cloneable so scripts can repeat.
#[derive(Clone)]
pub enum Scripted<T: Clone> {
    Ok(T),
    NotFound,
    Fail(&'static str),
}

impl<T: Clone> Scripted<T> {
    fn materialize(&self) -> Result<T, ApiError> {
        match self {
            Scripted::Ok(value) => Ok(value.clone()),
            Scripted::NotFound => Err(ApiError::Api {
                status: 404,
                message: "not found".to_string(),
            }),
            Scripted::Fail(message) => Err(ApiError::Api {
                status: 500,
                message: (*message).to_string(),
            }),
        }
    }
}

/// Response queue for one endpoint: pops entries until one remains,
/// then repeats it for every further call.
pub struct Script<T: Clone>(Mutex<VecDeque<Scripted<T>>>);

impl<T: Clone> Default for Script<T> {
    fn default() -> Self {
        Self(Mutex::new(VecDeque::new()))
    }
}

impl<T: Clone> Script<T> {
    pub fn set(&self, responses: Vec<Scripted<T>>) {
        *self.0.lock() = responses.into();
    }

    fn next(&self) -> Result<T, ApiError> {
        let mut queue = self.0.lock();
        let item = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        match item {
            Some(scripted) => scripted.materialize(),
            None => Err(ApiError::Api {
                status: 500,
                message: "no scripted response".to_string(),
            }),
        }
    }
}

/// Scripted dashboard API with call counters.
#[derive(Default)]
pub struct MockApi {
    pub jobs: Script<Job>,
    pub steps: Script<Vec<ExecutionStep>>,
    pub workflows: Script<Workflow>,
    pub submissions: Script<Submission>,
    pub forms: Script<Form>,
    pub artifacts: Script<Vec<Artifact>>,
    pub resubmits: Script<String>,
    pub reruns: Script<serde_json::Value>,

    pub job_calls: AtomicUsize,
    pub steps_calls: AtomicUsize,
    pub workflow_calls: AtomicUsize,
    pub submission_calls: AtomicUsize,
    pub form_calls: AtomicUsize,
    pub artifact_calls: AtomicUsize,
    /// Recorded (job_id, step_index) pairs for every rerun request.
    pub rerun_requests: Mutex<Vec<(String, usize)>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobsApi for MockApi {
    async fn get_job(&self, _job_id: &str) -> Result<Job, ApiError> {
        self.job_calls.fetch_add(1, Ordering::SeqCst);
        self.jobs.next()
    }

    async fn get_execution_steps(&self, _job_id: &str) -> Result<Vec<ExecutionStep>, ApiError> {
        self.steps_calls.fetch_add(1, Ordering::SeqCst);
        self.steps.next()
    }

    async fn get_workflow(&self, _workflow_id: &str) -> Result<Workflow, ApiError> {
        self.workflow_calls.fetch_add(1, Ordering::SeqCst);
        self.workflows.next()
    }

    async fn get_submission(&self, _submission_id: &str) -> Result<Submission, ApiError> {
        self.submission_calls.fetch_add(1, Ordering::SeqCst);
        self.submissions.next()
    }

    async fn get_form(&self, _form_id: &str) -> Result<Form, ApiError> {
        self.form_calls.fetch_add(1, Ordering::SeqCst);
        self.forms.next()
    }

    async fn list_artifacts(&self, _query: &ArtifactQuery) -> Result<ArtifactPage, ApiError> {
        self.artifact_calls.fetch_add(1, Ordering::SeqCst);
        self.artifacts.next().map(|artifacts| ArtifactPage { artifacts })
    }

    async fn resubmit_job(&self, _job_id: &str) -> Result<ResubmitReceipt, ApiError> {
        self.resubmits.next().map(|job_id| ResubmitReceipt { job_id })
    }

    async fn rerun_step(
        &self,
        job_id: &str,
        step_index: usize,
        _continue_after: bool,
    ) -> Result<serde_json::Value, ApiError> {
        self.rerun_requests
            .lock()
            .push((job_id.to_string(), step_index));
        self.reruns.next()
    }
}

// ---- record builders ----

pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    rfc3339.parse().expect("valid timestamp")
}

pub fn job(job_id: &str, status: JobStatus) -> Job {
    Job {
        job_id: job_id.to_string(),
        status,
        workflow_id: None,
        submission_id: None,
        created_at: ts("2025-03-01T09:00:00Z"),
        updated_at: ts("2025-03-01T09:00:00Z"),
        completed_at: None,
        output_url: None,
        execution_steps_s3_key: None,
        execution_steps: None,
    }
}

pub fn step(order: u32, started_at: Option<DateTime<Utc>>, output: Option<&str>) -> ExecutionStep {
    ExecutionStep {
        step_order: order,
        started_at,
        output: output.map(str::to_string),
        error: None,
    }
}

pub fn workflow(workflow_id: &str) -> Workflow {
    Workflow {
        workflow_id: workflow_id.to_string(),
        name: "Landing page generator".to_string(),
        description: None,
        steps: None,
        created_at: None,
    }
}

pub fn submission(submission_id: &str, form_id: Option<&str>) -> Submission {
    Submission {
        submission_id: submission_id.to_string(),
        form_id: form_id.map(str::to_string),
        data: None,
        created_at: None,
    }
}

pub fn form(form_id: &str) -> Form {
    Form {
        form_id: form_id.to_string(),
        name: "Intake form".to_string(),
        fields: None,
    }
}

pub fn image_artifact(name: &str, created_at: Option<DateTime<Utc>>) -> Artifact {
    Artifact {
        artifact_id: None,
        artifact_type: Some("image/png".to_string()),
        content_type: None,
        file_name: Some(name.to_string()),
        artifact_name: None,
        created_at,
        object_url: Some(format!("https://files.example.com/{name}")),
        public_url: None,
    }
}

pub fn file_artifact(name: &str, created_at: Option<DateTime<Utc>>) -> Artifact {
    Artifact {
        artifact_type: None,
        content_type: Some("text/html".to_string()),
        ..image_artifact(name, created_at)
    }
}
