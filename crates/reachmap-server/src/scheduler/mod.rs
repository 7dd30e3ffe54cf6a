//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! periodic dataset reload.

use std::sync::Arc;

use reachmap_data::DatasetStore;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// `reload_cron` is not a valid schedule, or the scheduler fails to start.
pub async fn build_scheduler(
    dataset: Arc<DatasetStore>,
    reload_cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_reload_job(&scheduler, dataset, reload_cron).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the dataset reload job on `reload_cron` (six-field cron,
/// seconds first). A failed reload keeps the current snapshot.
async fn register_reload_job(
    scheduler: &JobScheduler,
    dataset: Arc<DatasetStore>,
    reload_cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(reload_cron, move |_uuid, _lock| {
        let dataset = Arc::clone(&dataset);

        Box::pin(async move {
            tracing::info!("scheduler: starting dataset reload");
            run_reload_job(dataset).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(schedule = reload_cron, "scheduler: dataset reload registered");
    Ok(())
}

/// File reads and parsing are blocking, so the reload runs off the async
/// worker threads.
async fn run_reload_job(dataset: Arc<DatasetStore>) {
    match tokio::task::spawn_blocking(move || dataset.reload()).await {
        Ok(Ok(snapshot)) => {
            tracing::info!(version = snapshot.version, "scheduler: dataset reload complete");
        }
        // DatasetStore::reload already logged the cause.
        Ok(Err(_)) => {
            tracing::warn!("scheduler: dataset reload failed; serving previous snapshot");
        }
        Err(e) => tracing::error!(error = %e, "scheduler: dataset reload task panicked"),
    }
}
