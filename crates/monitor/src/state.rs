//! Snapshot of everything the job detail view renders.

use leadforge_core::{Form, Job, JobStatus, Submission, Workflow};
use serde::Serialize;

/// One consistent view of a watched job, published through a
/// [`tokio::sync::watch`] channel.
///
/// The watcher owns the single mutable copy; consumers only ever see
/// cloned snapshots. Error fields are display-ready strings, already
/// unwrapped from provider error shapes.
#[derive(Debug, Clone, Serialize)]
pub struct JobDetailSnapshot {
    /// The watched job, absent until the primary fetch succeeds.
    pub job: Option<Job>,
    /// Related entities, each best-effort: a failed fetch leaves the
    /// field `None` without touching the others.
    pub workflow: Option<Workflow>,
    pub submission: Option<Submission>,
    pub form: Option<Form>,
    /// True until the primary job fetch settles (success or failure).
    pub loading: bool,
    /// Set only when the primary job fetch fails.
    pub error: Option<String>,
    /// Step-trace load failure, distinct from `error` and dismissable
    /// on its own. "Trace not materialized yet" is not an error.
    pub steps_error: Option<String>,
    /// 0-based index of the step with an outstanding rerun. Doubles as
    /// the explicit marker for the optimistic `Completed` ->
    /// `Processing` status flip; the next authoritative poll always
    /// overwrites that flip.
    pub rerunning_step: Option<usize>,
}

impl Default for JobDetailSnapshot {
    fn default() -> Self {
        Self {
            job: None,
            workflow: None,
            submission: None,
            form: None,
            loading: true,
            error: None,
            steps_error: None,
            rerunning_step: None,
        }
    }
}

impl JobDetailSnapshot {
    /// Status of the watched job, if loaded.
    pub fn status(&self) -> Option<JobStatus> {
        self.job.as_ref().map(|j| j.status)
    }

    /// True while a step rerun is outstanding.
    pub fn is_rerunning(&self) -> bool {
        self.rerunning_step.is_some()
    }
}
