//! Read-only reference entities fetched for display alongside a job.
//!
//! A job may reference a workflow and a submission; a submission may
//! reference a form. Any of the three can be absent, and a failed fetch
//! of one never blocks the others.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// A user-defined, ordered sequence of AI processing steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub workflow_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// The form input data that triggered a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: String,
    #[serde(default)]
    pub form_id: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// An intake form attached to a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub form_id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Option<serde_json::Value>,
}
