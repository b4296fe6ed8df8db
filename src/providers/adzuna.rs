use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::models::job_alert::JobAlert;
use crate::models::listing::{
    Listing, COMPANY_NOT_SPECIFIED, DESCRIPTION_NOT_AVAILABLE, LOCATION_NOT_SPECIFIED,
};
use crate::providers::{scoring, JobProvider, RESULTS_PER_PAGE};

#[derive(Debug, Deserialize)]
struct AdzunaResponse {
    #[serde(default)]
    results: Vec<AdzunaJob>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdzunaJob {
    pub id: String,
    pub title: String,
    pub company: Option<AdzunaCompany>,
    pub location: Option<AdzunaLocation>,
    pub salary_min: Option<f64>,
    pub contract_type: Option<String>,
    pub description: Option<String>,
    pub redirect_url: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdzunaCompany {
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdzunaLocation {
    pub display_name: Option<String>,
}

#[derive(Clone)]
pub struct AdzunaProvider {
    client: Client,
    app_id: String,
    app_key: String,
    base_url: String,
}

impl AdzunaProvider {
    pub fn from_config(config: &Config) -> Option<Self> {
        let app_id = config.adzuna_app_id.clone()?;
        let app_key = config.adzuna_app_key.clone()?;
        Some(Self {
            client: Client::new(),
            app_id,
            app_key,
            base_url: config.adzuna_base_url.clone(),
        })
    }

    async fn fetch(&self, alert: &JobAlert) -> Result<Vec<AdzunaJob>> {
        let what = alert.keywords.join(" ");
        let location = alert.location.clone().unwrap_or_else(|| "France".to_string());

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
                ("what", what.as_str()),
                ("where", location.as_str()),
                ("sort_by", "date"),
            ])
            .query(&[("results_per_page", RESULTS_PER_PAGE)])
            .send()
            .await?
            .error_for_status()?;

        let body: AdzunaResponse = response.json().await?;
        Ok(body.results)
    }

    pub(crate) fn map_listing(alert: &JobAlert, job: AdzunaJob) -> Listing {
        let mut listing = Listing {
            external_id: format!("adzuna_{}", job.id),
            title: job.title,
            company: job
                .company
                .and_then(|c| c.display_name)
                .unwrap_or_else(|| COMPANY_NOT_SPECIFIED.to_string()),
            location: job
                .location
                .and_then(|l| l.display_name)
                .unwrap_or_else(|| LOCATION_NOT_SPECIFIED.to_string()),
            salary: job
                .salary_min
                .map(|min| format!("{}k€+", (min / 1000.0).round() as i64)),
            contract: job.contract_type,
            description: job
                .description
                .unwrap_or_else(|| DESCRIPTION_NOT_AVAILABLE.to_string()),
            url: job.redirect_url.unwrap_or_default(),
            source: "Adzuna".to_string(),
            published_at: job.created.unwrap_or_else(Utc::now),
            match_score: 0,
        };
        listing.match_score = scoring::match_score(alert, &listing);
        listing
    }
}

#[async_trait]
impl JobProvider for AdzunaProvider {
    fn name(&self) -> &'static str {
        "Adzuna"
    }

    async fn search(&self, alert: &JobAlert) -> Vec<Listing> {
        if alert.keywords.is_empty() {
            warn!(alert_id = %alert.id, "Alert has no keywords, skipping Adzuna search");
            return Vec::new();
        }

        match self.fetch(alert).await {
            Ok(jobs) => {
                info!(alert_id = %alert.id, found = jobs.len(), "Adzuna search finished");
                jobs.into_iter()
                    .map(|job| Self::map_listing(alert, job))
                    .collect()
            }
            Err(e) => {
                error!(alert_id = %alert.id, error = ?e, "Adzuna search failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn alert() -> JobAlert {
        JobAlert {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Backend".to_string(),
            keywords: vec!["python".to_string()],
            location: None,
            company: None,
            salary: None,
            contract: None,
            frequency: "daily".to_string(),
            active: true,
            last_check: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_optional_fields_become_placeholders() {
        let raw = serde_json::json!({
            "id": "4242",
            "title": "Python Developer"
        });
        let job: AdzunaJob = serde_json::from_value(raw).unwrap();
        let listing = AdzunaProvider::map_listing(&alert(), job);

        assert_eq!(listing.external_id, "adzuna_4242");
        assert_eq!(listing.company, COMPANY_NOT_SPECIFIED);
        assert_eq!(listing.location, LOCATION_NOT_SPECIFIED);
        assert_eq!(listing.description, DESCRIPTION_NOT_AVAILABLE);
        assert_eq!(listing.salary, None);
        assert_eq!(listing.source, "Adzuna");
    }

    #[test]
    fn salary_floor_is_rendered_in_thousands() {
        let raw = serde_json::json!({
            "id": "7",
            "title": "Python Developer",
            "salary_min": 45000.0,
            "company": { "display_name": "Acme" },
            "location": { "display_name": "Paris, France" },
            "redirect_url": "https://adzuna.example/7"
        });
        let job: AdzunaJob = serde_json::from_value(raw).unwrap();
        let listing = AdzunaProvider::map_listing(&alert(), job);

        assert_eq!(listing.salary.as_deref(), Some("45k€+"));
        assert_eq!(listing.company, "Acme");
        assert_eq!(listing.url, "https://adzuna.example/7");
        assert!(listing.match_score > 0);
    }
}
