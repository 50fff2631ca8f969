//! Execution-step trace reconciliation.
//!
//! Step traces are written to secondary storage after the job record
//! exists, so they are fetched through a dedicated endpoint and merged
//! into the held job. A not-found response means "not materialized
//! yet" — an empty trace, never an error. Anything else becomes a
//! step-load error that leaves the job itself usable, and a transient
//! failure never regresses steps that were already displayed.

use leadforge_client::JobsApi;
use tokio::sync::watch;

use crate::state::JobDetailSnapshot;

pub(crate) async fn reconcile_steps(
    api: &dyn JobsApi,
    job_id: &str,
    tx: &watch::Sender<JobDetailSnapshot>,
) {
    match api.get_execution_steps(job_id).await {
        Ok(steps) => {
            tx.send_modify(|s| {
                if let Some(job) = &mut s.job {
                    job.execution_steps = Some(steps);
                }
                s.steps_error = None;
            });
        }
        Err(e) if e.is_not_found() => {
            tracing::debug!(job_id = %job_id, "Step trace not materialized yet");
            tx.send_modify(|s| {
                s.steps_error = None;
                if let Some(job) = &mut s.job {
                    if job.execution_steps.is_none() {
                        job.execution_steps = Some(Vec::new());
                    }
                }
            });
        }
        Err(e) => {
            let message = e.display_message("Failed to load execution steps");
            tracing::warn!(job_id = %job_id, error = %message, "Step trace load failed");
            tx.send_modify(|s| {
                let pointer = s
                    .job
                    .as_ref()
                    .and_then(|j| j.execution_steps_s3_key.clone());
                s.steps_error = Some(match pointer {
                    Some(key) => format!("{message} (trace: {key})"),
                    None => message,
                });
            });
        }
    }
}
