//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! The expiry sweep is not needed for correctness - expiry is enforced at
//! redemption time - but it bounds storage growth by purging codes past
//! `expires_at` plus the configured grace window. It only ever deletes codes
//! no redemption could still accept, so it is safe to run concurrently with
//! issue/redeem on any number of instances.

use anyhow::Result;
use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::kernel::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(deps: ServerDeps) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    // Verification-code sweep - runs every ten minutes
    let sweep_deps = deps.clone();
    let sweep_job = Job::new_async("0 */10 * * * *", move |_uuid, _lock| {
        let deps = sweep_deps.clone();
        Box::pin(async move {
            if let Err(e) = run_code_sweep(&deps).await {
                tracing::error!("Verification-code sweep failed: {}", e);
            }
        })
    })?;

    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (verification-code sweep every 10 minutes)");
    Ok(scheduler)
}

/// Purge verification codes past their expiry plus the grace window.
async fn run_code_sweep(deps: &ServerDeps) -> Result<()> {
    let purged = deps
        .ledger
        .sweep_expired(Utc::now(), deps.code_sweep_grace)
        .await?;

    if purged > 0 {
        tracing::info!("Purged {} expired verification codes", purged);
    }
    Ok(())
}
