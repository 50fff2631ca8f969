//! `leadforge-watch` — follow a job from the command line until it
//! reaches a terminal status.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use leadforge_client::DashboardApi;
use leadforge_monitor::{JobWatcher, WatcherConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadforge_monitor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let job_id = std::env::args()
        .nth(1)
        .context("usage: leadforge-watch <job-id>")?;
    let base_url =
        std::env::var("LEADFORGE_API_URL").context("LEADFORGE_API_URL must be set")?;

    let mut api = DashboardApi::new(base_url);
    if let Ok(key) = std::env::var("LEADFORGE_API_KEY") {
        api = api.with_api_key(key);
    }

    let mut config = WatcherConfig::default();
    if let Some(ms) = std::env::var("LEADFORGE_POLL_MS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.poll_interval = Duration::from_millis(ms);
    }

    let watcher = JobWatcher::spawn(Arc::new(api), job_id.clone(), config);
    let mut updates = watcher.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(job_id = %job_id, "Interrupted");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();

                if let Some(error) = &snapshot.error {
                    tracing::error!(job_id = %job_id, error = %error, "Job load failed");
                    break;
                }
                if let Some(steps_error) = &snapshot.steps_error {
                    tracing::warn!(job_id = %job_id, error = %steps_error, "Step trace unavailable");
                }
                if let Some(job) = &snapshot.job {
                    tracing::info!(
                        job_id = %job.job_id,
                        status = %job.status,
                        steps = job.steps().len(),
                        "Job update",
                    );
                    if job.status.is_terminal() {
                        if let Some(url) = &job.output_url {
                            tracing::info!(job_id = %job.job_id, output_url = %url, "Output ready");
                        }
                        break;
                    }
                }
            }
        }
    }

    watcher.shutdown();
    Ok(())
}
