use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::job_alert::JobAlert;
use crate::services::alert_store::{AlertStore, NewJobOffer};
use crate::services::job_search_service::JobSearchService;

/// Stored description bound, in characters.
const DESCRIPTION_MAX_CHARS: usize = 1000;
/// Unsaved offers older than this are pruned.
const RETENTION_DAYS: i64 = 30;
/// Pause between consecutive alerts in one sweep, to respect provider rate
/// limits. Alerts are processed sequentially on purpose.
const ALERT_PACING: StdDuration = StdDuration::from_secs(2);

#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub processed: bool,
    pub new_offers: u32,
    pub total_found: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResult {
    fn skipped() -> Self {
        Self {
            processed: false,
            new_offers: 0,
            total_found: 0,
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            processed: false,
            new_offers: 0,
            total_found: 0,
            error: Some(message),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertRunReport {
    pub alert_id: Uuid,
    pub title: String,
    #[serde(flatten)]
    pub result: ProcessingResult,
}

/// Orchestrates one alert's run: search, upsert, prune, touch `last_check`.
/// Never panics or propagates past its boundary; a failed alert is reported
/// in the result and retried naturally on the next due sweep.
#[derive(Clone)]
pub struct AlertProcessor {
    store: Arc<dyn AlertStore>,
    search: JobSearchService,
}

impl AlertProcessor {
    pub fn new(store: Arc<dyn AlertStore>, search: JobSearchService) -> Self {
        Self { store, search }
    }

    pub async fn process_alert(&self, alert_id: Uuid) -> ProcessingResult {
        match self.run(alert_id).await {
            Ok(result) => result,
            Err(e) => {
                error!(alert_id = %alert_id, error = ?e, "Alert processing failed");
                ProcessingResult::failed(e.to_string())
            }
        }
    }

    async fn run(&self, alert_id: Uuid) -> Result<ProcessingResult> {
        let Some(alert) = self.store.find_alert_by_id(alert_id).await? else {
            warn!(alert_id = %alert_id, "Alert not found, nothing to process");
            return Ok(ProcessingResult::skipped());
        };
        if !alert.active {
            info!(alert_id = %alert_id, "Alert is inactive, nothing to process");
            return Ok(ProcessingResult::skipped());
        }

        info!(alert_id = %alert.id, title = %alert.title, "Processing alert");
        let listings = self.search.search_all_sources(&alert).await;
        let total_found = listings.len() as u32;

        if listings.is_empty() {
            self.store
                .update_alert_last_check(alert.id, Utc::now())
                .await?;
            info!(alert_id = %alert.id, "No listings found");
            return Ok(ProcessingResult {
                processed: true,
                new_offers: 0,
                total_found: 0,
                error: None,
            });
        }

        let mut new_offers = 0u32;
        for listing in listings {
            let offer = NewJobOffer {
                external_id: listing.external_id,
                source: listing.source,
                title: listing.title,
                company: listing.company,
                location: listing.location,
                salary: listing.salary,
                contract: listing.contract,
                description: Some(truncate_description(&listing.description)),
                url: listing.url,
                published_at: listing.published_at,
                match_score: listing.match_score,
                alert_id: alert.id,
                user_id: alert.user_id,
            };
            match self.store.upsert_job_offer(&offer).await {
                Ok(true) => {
                    new_offers += 1;
                    debug!(title = %offer.title, company = %offer.company, "New offer saved");
                }
                Ok(false) => {
                    debug!(title = %offer.title, company = %offer.company, "Offer refreshed");
                }
                Err(e) => {
                    // One bad record must not abort the rest of the batch.
                    error!(title = %offer.title, error = ?e, "Failed to save offer");
                }
            }
        }

        self.prune_old_offers(alert.user_id).await;

        self.store
            .update_alert_last_check(alert.id, Utc::now())
            .await?;

        info!(
            alert_id = %alert.id,
            new_offers,
            total_found,
            "Alert processed"
        );
        Ok(ProcessingResult {
            processed: true,
            new_offers,
            total_found,
            error: None,
        })
    }

    /// Retention sweep: drop the user's unsaved offers older than 30 days.
    /// Idempotent, safe after every run.
    pub async fn prune_old_offers(&self, user_id: Uuid) {
        let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
        match self
            .store
            .delete_offers_older_than(user_id, cutoff, true)
            .await
        {
            Ok(removed) if removed > 0 => {
                info!(user_id = %user_id, removed, "Pruned old offers");
            }
            Ok(_) => {}
            Err(e) => error!(user_id = %user_id, error = ?e, "Pruning sweep failed"),
        }
    }

    /// Process every active alert whose re-check interval has elapsed.
    /// Sequential by design, with a pacing delay between alerts; one alert's
    /// failure never stops the rest of the sweep.
    pub async fn process_all_alerts(&self) -> Vec<AlertRunReport> {
        let alerts = match self.store.find_active_alerts().await {
            Ok(alerts) => alerts,
            Err(e) => {
                error!(error = ?e, "Could not load active alerts");
                return Vec::new();
            }
        };
        info!(active = alerts.len(), "Starting alert sweep");

        let mut reports = Vec::new();
        for alert in alerts {
            if !is_due(&alert, Utc::now()) {
                continue;
            }
            if !reports.is_empty() {
                tokio::time::sleep(ALERT_PACING).await;
            }
            let result = self.process_alert(alert.id).await;
            reports.push(AlertRunReport {
                alert_id: alert.id,
                title: alert.title,
                result,
            });
        }

        info!(processed = reports.len(), "Alert sweep finished");
        reports
    }
}

/// Whether an active alert should be re-searched: never-checked alerts are
/// always due; otherwise the elapsed time must reach the alert's frequency
/// interval. Unknown frequencies fall back to daily.
pub fn is_due(alert: &JobAlert, now: DateTime<Utc>) -> bool {
    let Some(last_check) = alert.last_check else {
        return true;
    };
    let elapsed_hours = (now - last_check).num_hours();
    match alert.frequency.as_str() {
        "daily" => elapsed_hours >= 24,
        "weekly" => elapsed_hours >= 168,
        _ => elapsed_hours >= 24,
    }
}

fn truncate_description(description: &str) -> String {
    description.chars().take(DESCRIPTION_MAX_CHARS).collect()
}
