//! Artifact classification and step assignment.
//!
//! Artifacts carry no foreign key to the execution step that produced
//! them. Association is inferred: a `step_<N>` hint in the filename
//! wins outright; otherwise the artifact is matched to the first step
//! (ascending order) whose start time falls within
//! [`ASSIGNMENT_WINDOW_SECS`] of the artifact's creation time. An
//! artifact matching neither stays unassigned — present in the flat
//! list, absent from both per-step maps.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::job::ExecutionStep;
use crate::types::Timestamp;

/// Maximum distance between a step's start and an artifact's creation
/// time for the proximity fallback to associate the two.
pub const ASSIGNMENT_WINDOW_SECS: i64 = 5 * 60;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A file produced during job execution, as returned by `GET /artifacts`.
///
/// Field pairs (`artifact_type`/`content_type`, `file_name`/
/// `artifact_name`, `object_url`/`public_url`) exist because two
/// generations of the artifact service populate different columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub artifact_type: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub artifact_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub object_url: Option<String>,
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Artifact {
    /// True when either type field mentions "image" (case-insensitive).
    pub fn is_image(&self) -> bool {
        [&self.artifact_type, &self.content_type].into_iter().any(|t| {
            t.as_deref()
                .is_some_and(|s| s.to_ascii_lowercase().contains("image"))
        })
    }

    /// Best available name for display and pattern matching.
    pub fn name(&self) -> Option<&str> {
        self.file_name.as_deref().or(self.artifact_name.as_deref())
    }

    /// Download URL, preferring the signed object URL.
    pub fn url(&self) -> Option<&str> {
        self.object_url.as_deref().or(self.public_url.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Step assignment
// ---------------------------------------------------------------------------

fn step_hint_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)step_(\d+)").expect("step hint pattern is valid"))
}

/// Parse a 1-based step order from a `step_<N>` filename hint.
pub fn step_order_from_name(name: &str) -> Option<u32> {
    step_hint_pattern()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Infer the step that produced an artifact.
///
/// Order of preference: the filename hint, then the first step in
/// ascending `step_order` whose `started_at` is within the assignment
/// window of the artifact's `created_at`. When an artifact falls inside
/// the window of more than one step, the lowest step order wins.
pub fn assign_step(artifact: &Artifact, steps: &[ExecutionStep]) -> Option<u32> {
    if let Some(order) = artifact.name().and_then(step_order_from_name) {
        return Some(order);
    }

    let created = artifact.created_at?;
    let mut ordered: Vec<&ExecutionStep> = steps.iter().collect();
    ordered.sort_by_key(|s| s.step_order);

    for step in ordered {
        let Some(started) = step.started_at else {
            continue;
        };
        if (created - started).num_seconds().abs() <= ASSIGNMENT_WINDOW_SECS {
            return Some(step.step_order);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Partitioning
// ---------------------------------------------------------------------------

/// Artifacts bucketed by inferred step, plus the flat fetched list.
///
/// Derived data: safe to discard and recompute from `all` at any time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactPartition {
    /// Image artifacts keyed by step order.
    pub images_by_step: BTreeMap<u32, Vec<Artifact>>,
    /// Non-image artifacts keyed by step order.
    pub files_by_step: BTreeMap<u32, Vec<Artifact>>,
    /// Every fetched artifact, unassigned ones included.
    pub all: Vec<Artifact>,
}

/// Partition a job's artifacts into per-step image and file buckets.
pub fn partition_artifacts(artifacts: &[Artifact], steps: &[ExecutionStep]) -> ArtifactPartition {
    let mut partition = ArtifactPartition {
        all: artifacts.to_vec(),
        ..Default::default()
    };

    for artifact in artifacts {
        let Some(order) = assign_step(artifact, steps) else {
            continue;
        };
        let bucket = if artifact.is_image() {
            &mut partition.images_by_step
        } else {
            &mut partition.files_by_step
        };
        bucket.entry(order).or_default().push(artifact.clone());
    }

    partition
}

// ---------------------------------------------------------------------------
// Step signature
// ---------------------------------------------------------------------------

/// The (order, start-time) projection of a step list.
///
/// Two step lists with equal signatures partition a given artifact set
/// identically, so the organizer recomputes only when this changes.
pub type StepSignature = Vec<(u32, Option<Timestamp>)>;

/// Project a step list down to the fields that drive assignment.
pub fn step_signature(steps: &[ExecutionStep]) -> StepSignature {
    steps.iter().map(|s| (s.step_order, s.started_at)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
