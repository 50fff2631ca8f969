//! The job watcher: load, poll, reconcile, rerun.
//!
//! [`JobWatcher`] owns the mutable job state for one job id and one
//! page lifetime. Every mutation flows through the single
//! `watch::Sender` publish path, so the poller and the rerun
//! coordinator can interleave freely — merges are idempotent and
//! last-write-wins per field.
//!
//! The poller is an explicit two-state machine ([`PollerPhase`]): it
//! arms when the loaded job is processing or a rerun is outstanding,
//! and disarms when that condition clears or the watcher is torn down.
//! Teardown is cooperative via [`CancellationToken`]; no tick fires
//! after [`JobWatcher::shutdown`].

use std::sync::{Arc, Weak};

use leadforge_client::{JobsApi, DEFAULT_ERROR_MESSAGE};
use leadforge_core::{ExecutionStep, JobStatus};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::WatcherConfig;
use crate::error::WatchError;
use crate::loader::load_detail;
use crate::reconcile::reconcile_steps;
use crate::state::JobDetailSnapshot;

/// Poller state: either no interval is armed, or one poll task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerPhase {
    Idle,
    Polling,
}

/// Watches one job: initial load, status polling, step reconciliation,
/// and step-rerun coordination.
pub struct JobWatcher {
    api: Arc<dyn JobsApi>,
    job_id: String,
    config: WatcherConfig,
    snapshot_tx: watch::Sender<JobDetailSnapshot>,
    phase: Mutex<PollerPhase>,
    cancel: CancellationToken,
    /// Back-reference for handing the poll task an owning handle.
    weak: Weak<JobWatcher>,
}

impl JobWatcher {
    /// Create a watcher and kick off the initial load in the
    /// background. Subscribe before or after; the watch channel always
    /// yields the latest snapshot.
    pub fn spawn(
        api: Arc<dyn JobsApi>,
        job_id: impl Into<String>,
        config: WatcherConfig,
    ) -> Arc<Self> {
        let (snapshot_tx, _) = watch::channel(JobDetailSnapshot::default());
        let watcher = Arc::new_cyclic(|weak| Self {
            api,
            job_id: job_id.into(),
            config,
            snapshot_tx,
            phase: Mutex::new(PollerPhase::Idle),
            cancel: CancellationToken::new(),
            weak: weak.clone(),
        });

        let task = Arc::clone(&watcher);
        tokio::spawn(async move {
            tokio::select! {
                _ = task.cancel.cancelled() => {}
                _ = task.load() => {}
            }
        });

        watcher
    }

    /// The job id this watcher is bound to.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<JobDetailSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> JobDetailSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Current poller state.
    pub fn poller_phase(&self) -> PollerPhase {
        *self.phase.lock()
    }

    /// Reload the job and everything around it. Idempotent; safe to
    /// call while a previous refresh is still pending.
    pub async fn refresh(&self) {
        self.load().await;
    }

    /// Request a server-side rerun of one step (0-based index).
    ///
    /// At most one rerun may be outstanding per job; a second request
    /// is rejected before any network call. On acceptance the target
    /// step is locally cleared so it renders as in-progress, and the
    /// poller takes over observing resolution. If the request itself
    /// fails, the marker is cleared immediately and the extracted
    /// message is returned.
    pub async fn rerun_step(
        &self,
        step_index: usize,
        continue_after: bool,
    ) -> Result<(), WatchError> {
        enum Guard {
            Accepted,
            Outstanding,
            NotLoaded,
        }

        let mut guard = Guard::NotLoaded;
        self.snapshot_tx.send_if_modified(|s| {
            if s.job.is_none() {
                guard = Guard::NotLoaded;
                return false;
            }
            if s.rerunning_step.is_some() {
                guard = Guard::Outstanding;
                return false;
            }
            s.rerunning_step = Some(step_index);
            guard = Guard::Accepted;
            true
        });

        match guard {
            Guard::NotLoaded => return Err(WatchError::JobNotLoaded),
            Guard::Outstanding => return Err(WatchError::RerunOutstanding),
            Guard::Accepted => {}
        }

        match self
            .api
            .rerun_step(&self.job_id, step_index, continue_after)
            .await
        {
            Ok(_) => {
                self.snapshot_tx.send_modify(|s| {
                    let Some(job) = &mut s.job else { return };
                    if let Some(steps) = &mut job.execution_steps {
                        if let Some(step) = steps
                            .iter_mut()
                            .find(|st| st.step_order as usize == step_index + 1)
                        {
                            // Cleared so the step renders as in-progress
                            // until the next reconcile.
                            step.output = None;
                            step.error = None;
                        }
                    }
                    if job.status == JobStatus::Completed {
                        // Optimistic flip; the next authoritative poll
                        // overwrites it.
                        job.status = JobStatus::Processing;
                    }
                });
                tracing::info!(job_id = %self.job_id, step_index, "Step rerun requested");
                self.sync_poller();
                Ok(())
            }
            Err(e) => {
                self.snapshot_tx.send_modify(|s| s.rerunning_step = None);
                let message = e.display_message(DEFAULT_ERROR_MESSAGE);
                tracing::warn!(
                    job_id = %self.job_id,
                    step_index,
                    error = %message,
                    "Step rerun request failed",
                );
                Err(WatchError::Request(message))
            }
        }
    }

    /// Queue a fresh run of this job's workflow against the same
    /// submission. Returns the NEW job's id; this watcher's state is
    /// untouched (the caller switches to a new watcher for the new id).
    pub async fn resubmit(&self) -> Result<String, WatchError> {
        match self.api.resubmit_job(&self.job_id).await {
            Ok(receipt) => {
                tracing::info!(job_id = %self.job_id, new_job_id = %receipt.job_id, "Job resubmitted");
                Ok(receipt.job_id)
            }
            Err(e) => Err(WatchError::Request(
                e.display_message(DEFAULT_ERROR_MESSAGE),
            )),
        }
    }

    /// Tear the watcher down. The poll task observes the cancellation
    /// before its next tick, so no tick fires after this returns.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    // ---- private helpers ----

    async fn load(&self) {
        load_detail(self.api.as_ref(), &self.job_id, &self.snapshot_tx).await;
        self.sync_poller();
    }

    /// Poll while the job is processing or a rerun is outstanding.
    fn should_poll(&self) -> bool {
        let s = self.snapshot_tx.borrow();
        let processing = s
            .job
            .as_ref()
            .is_some_and(|j| j.status == JobStatus::Processing);
        processing || s.rerunning_step.is_some()
    }

    /// Idle -> Polling transition: arm the poll task if the condition
    /// holds and none is running.
    fn sync_poller(&self) {
        if self.cancel.is_cancelled() || !self.should_poll() {
            return;
        }
        let Some(watcher) = self.weak.upgrade() else {
            return;
        };
        let mut phase = self.phase.lock();
        if *phase == PollerPhase::Polling {
            return;
        }
        *phase = PollerPhase::Polling;
        drop(phase);

        tokio::spawn(poll_loop(watcher));
    }

    /// One poll cycle: re-fetch the job, apply only `status` and
    /// `updated_at`, then reconcile the step trace against the fresh
    /// snapshot. Fetch failures are swallowed; the next tick retries.
    async fn tick(&self) {
        match self.api.get_job(&self.job_id).await {
            Ok(fresh) if fresh.job_id == self.job_id => {
                self.snapshot_tx.send_modify(|s| {
                    if let Some(job) = &mut s.job {
                        job.status = fresh.status;
                        job.updated_at = fresh.updated_at;
                    }
                    if s.rerunning_step.is_some() && fresh.status != JobStatus::Processing {
                        s.rerunning_step = None;
                    }
                });
            }
            Ok(other) => {
                tracing::warn!(
                    job_id = %self.job_id,
                    received = %other.job_id,
                    "Discarding poll result for a different id",
                );
            }
            Err(e) => {
                tracing::debug!(job_id = %self.job_id, error = %e, "Poll tick fetch failed; retrying next tick");
            }
        }

        reconcile_steps(self.api.as_ref(), &self.job_id, &self.snapshot_tx).await;

        // A rerun also resolves when its step settles again.
        self.snapshot_tx.send_if_modified(|s| {
            let Some(index) = s.rerunning_step else {
                return false;
            };
            let settled = s.job.as_ref().is_some_and(|j| {
                j.steps()
                    .iter()
                    .find(|st| st.step_order as usize == index + 1)
                    .is_some_and(ExecutionStep::is_settled)
            });
            if settled {
                s.rerunning_step = None;
            }
            settled
        });
    }
}

/// The armed poller: ticks on a fixed interval until the poll
/// condition clears or the watcher is cancelled, then returns the
/// phase to idle.
async fn poll_loop(watcher: Arc<JobWatcher>) {
    let period = watcher.config.poll_interval;
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    let mut rerun_ticks: u32 = 0;

    loop {
        tokio::select! {
            _ = watcher.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if !watcher.should_poll() {
            break;
        }

        watcher.tick().await;

        if watcher.snapshot_tx.borrow().rerunning_step.is_some() {
            rerun_ticks += 1;
            if rerun_ticks >= watcher.config.rerun_timeout_ticks {
                // The UI must never stay "in progress" forever: give
                // up on observing resolution and trust a full reload.
                tracing::warn!(
                    job_id = %watcher.job_id,
                    ticks = rerun_ticks,
                    "Rerun unresolved; clearing marker and reloading",
                );
                watcher.snapshot_tx.send_modify(|s| s.rerunning_step = None);
                load_detail(watcher.api.as_ref(), &watcher.job_id, &watcher.snapshot_tx).await;
                rerun_ticks = 0;
            }
        } else {
            rerun_ticks = 0;
        }
    }

    *watcher.phase.lock() = PollerPhase::Idle;

    // The poll condition may have re-armed between the last check and
    // going idle (e.g. a rerun accepted mid-teardown of this task).
    if !watcher.cancel.is_cancelled() && watcher.should_poll() {
        watcher.sync_poller();
    }
}
