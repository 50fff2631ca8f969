//! Tunable parameters for the job watcher.

use std::time::Duration;

/// Tunables for [`JobWatcher`](crate::JobWatcher) polling and rerun
/// resolution.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Delay between poll ticks while a job is processing or a rerun
    /// is outstanding.
    pub poll_interval: Duration,
    /// Poll cycles a rerun may stay unresolved before the watcher
    /// force-clears the marker and reloads the job.
    pub rerun_timeout_ticks: u32,
    /// Page size for the one-shot artifact fetch.
    pub artifact_limit: u32,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            rerun_timeout_ticks: 60,
            artifact_limit: 100,
        }
    }
}
