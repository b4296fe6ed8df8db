use anyhow::anyhow;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::AppState;

/// Alert sweep: every 6 hours.
const ALERT_SWEEP_SCHEDULE: &str = "0 0 */6 * * *";
/// Maintenance sweep: daily at 02:00.
const MAINTENANCE_SCHEDULE: &str = "0 0 2 * * *";

/// Start the background scheduler. Each tick is fire-and-forget: a failing
/// sweep is logged and never cancels future ticks.
pub async fn start(state: AppState) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| anyhow!("failed to create scheduler: {}", e))?;

    let sweep_state = state.clone();
    let alert_sweep = Job::new_async(ALERT_SWEEP_SCHEDULE, move |_id, _lock| {
        let state = sweep_state.clone();
        Box::pin(async move {
            info!("Scheduled alert sweep starting");
            let reports = state.alert_processor.process_all_alerts().await;
            let failures = reports.iter().filter(|r| r.result.error.is_some()).count();
            if failures > 0 {
                error!(failures, total = reports.len(), "Alert sweep finished with failures");
            } else {
                info!(total = reports.len(), "Alert sweep finished");
            }
        })
    })
    .map_err(|e| anyhow!("failed to build alert sweep job: {}", e))?;

    let maintenance = Job::new_async(MAINTENANCE_SCHEDULE, move |_id, _lock| {
        Box::pin(async move {
            // Retention already runs per-alert after every processing cycle;
            // this slot exists for future global maintenance.
            info!("Daily maintenance tick");
        })
    })
    .map_err(|e| anyhow!("failed to build maintenance job: {}", e))?;

    scheduler
        .add(alert_sweep)
        .await
        .map_err(|e| anyhow!("failed to register alert sweep: {}", e))?;
    scheduler
        .add(maintenance)
        .await
        .map_err(|e| anyhow!("failed to register maintenance job: {}", e))?;

    scheduler
        .start()
        .await
        .map_err(|e| anyhow!("failed to start scheduler: {}", e))?;

    info!("Background scheduler started");
    Ok(scheduler)
}
