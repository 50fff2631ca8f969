//! Shared type aliases used across the workspace.

use chrono::{DateTime, Utc};

/// Opaque server-assigned identifier. The dashboard API issues string
/// ids for every entity (jobs, workflows, submissions, forms).
pub type EntityId = String;

/// UTC timestamp carried on every wire-facing record.
pub type Timestamp = DateTime<Utc>;
