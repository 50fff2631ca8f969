//! Cross-view cache of job preview summaries.
//!
//! List rows and search-palette entries show a compact preview of a
//! job without mounting a full watcher. Previews are cached for the
//! life of the cache and never invalidated — staleness is the accepted
//! tradeoff for skipping redundant fetches. The cache is an explicit
//! object injected where needed, so its lifetime (and test isolation)
//! is the owner's call.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use leadforge_client::{JobsApi, DEFAULT_ERROR_MESSAGE};
use leadforge_core::types::Timestamp;
use leadforge_core::{Job, JobStatus};
use parking_lot::RwLock;
use serde::Serialize;

use crate::singleflight::Singleflight;

/// Compact job summary for list rows and search results.
#[derive(Debug, Clone, Serialize)]
pub struct JobPreview {
    pub job_id: String,
    pub status: JobStatus,
    pub output_url: Option<String>,
    pub updated_at: Timestamp,
}

impl From<&Job> for JobPreview {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.job_id.clone(),
            status: job.status,
            output_url: job.output_url.clone(),
            updated_at: job.updated_at,
        }
    }
}

/// Session-scoped preview store, append-only per key.
pub struct PreviewCache {
    api: Arc<dyn JobsApi>,
    entries: RwLock<HashMap<String, JobPreview>>,
    flights: Singleflight<JobPreview, String>,
}

impl PreviewCache {
    pub fn new(api: Arc<dyn JobsApi>) -> Self {
        Self {
            api,
            entries: RwLock::new(HashMap::new()),
            flights: Singleflight::new(),
        }
    }

    /// The cached preview for a job, fetching it on first request.
    /// Concurrent first requests for the same id are coalesced.
    pub async fn get_or_fetch(&self, job_id: &str) -> Result<JobPreview, String> {
        if let Some(hit) = self.entries.read().get(job_id).cloned() {
            return Ok(hit);
        }

        let api = Arc::clone(&self.api);
        let id = job_id.to_string();
        let preview = self
            .flights
            .run(job_id, move || {
                async move {
                    api.get_job(&id)
                        .await
                        .map(|job| JobPreview::from(&job))
                        .map_err(|e| e.display_message(DEFAULT_ERROR_MESSAGE))
                }
                .boxed()
            })
            .await?;

        // Append-only: the first stored preview for a key wins.
        self.entries
            .write()
            .entry(job_id.to_string())
            .or_insert_with(|| preview.clone());

        Ok(preview)
    }

    /// The cached preview, without fetching.
    pub fn peek(&self, job_id: &str) -> Option<JobPreview> {
        self.entries.read().get(job_id).cloned()
    }

    /// Number of cached previews.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
