//! Domain model and pure decision logic for the Leadforge dashboard core.
//!
//! This crate is I/O-free. It defines the wire-facing records the
//! dashboard works with ([`Job`], [`ExecutionStep`], [`Artifact`] and
//! the read-only reference entities) plus the classification logic the
//! monitor layer drives:
//!
//! - job-id validation, including the static-export routing sentinel;
//! - artifact image/file classification and artifact-to-step
//!   assignment (filename hint first, creation-time proximity second);
//! - the step-list signature used to decide when a re-partition is due.

pub mod artifact;
pub mod error;
pub mod job;
pub mod reference;
pub mod types;

pub use artifact::{partition_artifacts, step_signature, Artifact, ArtifactPartition};
pub use error::CoreError;
pub use job::{validate_job_id, ExecutionStep, Job, JobStatus, JOB_ID_SENTINEL};
pub use reference::{Form, Submission, Workflow};
