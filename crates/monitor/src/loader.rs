//! Job detail loading: the primary fetch plus the best-effort fan-out
//! for related entities.
//!
//! The primary job fetch is the only one allowed to set the snapshot's
//! `error`. Workflow, submission, and form are fetched in parallel
//! with independent failure isolation: a rejected fetch logs a warning
//! and leaves its field untouched, so one bad section never clears or
//! blocks another.

use std::future::Future;

use leadforge_client::{ApiError, JobsApi, DEFAULT_ERROR_MESSAGE};
use leadforge_core::{validate_job_id, Job};
use tokio::sync::watch;

use crate::reconcile::reconcile_steps;
use crate::state::JobDetailSnapshot;

/// Load the job and everything the detail view shows.
///
/// Also used for the rerun-timeout forced reload and for explicit
/// refreshes; concurrent invocations are safe because every mutation
/// is an atomic last-write-wins publish.
pub(crate) async fn load_detail(
    api: &dyn JobsApi,
    job_id: &str,
    tx: &watch::Sender<JobDetailSnapshot>,
) {
    if let Err(e) = validate_job_id(job_id) {
        tracing::debug!(job_id = %job_id, "Rejected job id before fetch");
        tx.send_modify(|s| {
            s.loading = false;
            s.error = Some(e.to_string());
        });
        return;
    }

    tx.send_modify(|s| s.loading = true);

    let job = match api.get_job(job_id).await {
        Ok(job) if job.job_id == job_id => job,
        Ok(other) => {
            // A record for some other id is never applied.
            tracing::warn!(
                job_id = %job_id,
                received = %other.job_id,
                "Discarding job record for a different id",
            );
            tx.send_modify(|s| {
                s.loading = false;
                s.error = Some(DEFAULT_ERROR_MESSAGE.to_string());
            });
            return;
        }
        Err(e) => {
            let message = e.display_message(DEFAULT_ERROR_MESSAGE);
            tracing::warn!(job_id = %job_id, error = %message, "Job load failed");
            tx.send_modify(|s| {
                s.loading = false;
                s.error = Some(message);
            });
            return;
        }
    };

    tx.send_modify(|s| {
        s.job = Some(job.clone());
        s.error = None;
        s.loading = false;
    });

    load_related(api, &job, tx).await;
    reconcile_steps(api, job_id, tx).await;
}

/// Fan out the related-entity fetches, best-effort and in parallel.
///
/// The submission fetch chains into the form fetch when the submission
/// names a form; the workflow fetch runs alongside.
pub(crate) async fn load_related(
    api: &dyn JobsApi,
    job: &Job,
    tx: &watch::Sender<JobDetailSnapshot>,
) {
    let workflow = async {
        match &job.workflow_id {
            Some(id) => best_effort("workflow", api.get_workflow(id)).await,
            None => None,
        }
    };

    let submission_and_form = async {
        let Some(submission_id) = &job.submission_id else {
            return (None, None);
        };
        let Some(submission) = best_effort("submission", api.get_submission(submission_id)).await
        else {
            return (None, None);
        };
        let form = match &submission.form_id {
            Some(form_id) => best_effort("form", api.get_form(form_id)).await,
            None => None,
        };
        (Some(submission), form)
    };

    let (workflow, (submission, form)) = tokio::join!(workflow, submission_and_form);

    tx.send_modify(|s| {
        if workflow.is_some() {
            s.workflow = workflow;
        }
        if submission.is_some() {
            s.submission = submission;
        }
        if form.is_some() {
            s.form = form;
        }
    });
}

/// Await a related-entity fetch, turning failure into an omitted
/// section instead of an error.
async fn best_effort<T>(
    entity: &'static str,
    fut: impl Future<Output = Result<T, ApiError>>,
) -> Option<T> {
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(entity, error = %e, "Related fetch failed; section omitted");
            None
        }
    }
}
