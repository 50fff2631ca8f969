//! Error type for watcher-level operations.

/// Errors surfaced by [`JobWatcher`](crate::JobWatcher) operations.
///
/// Load, reconcile, and poll failures never appear here — they land in
/// the snapshot's `error`/`steps_error` fields as display-ready
/// strings, or are swallowed per the tick failure policy. This enum
/// covers the explicitly requested operations (reruns, resubmits).
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// A step rerun is already outstanding for this job; at most one
    /// is allowed at a time.
    #[error("A step rerun is already in progress for this job")]
    RerunOutstanding,

    /// The job has not loaded yet, so there is nothing to rerun.
    #[error("Job is not loaded yet")]
    JobNotLoaded,

    /// The request failed; the payload is a display-ready message
    /// extracted from the API error.
    #[error("{0}")]
    Request(String),
}
