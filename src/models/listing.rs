use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const COMPANY_NOT_SPECIFIED: &str = "Company not specified";
pub const LOCATION_NOT_SPECIFIED: &str = "Location not specified";
pub const DESCRIPTION_NOT_AVAILABLE: &str = "Description not available";

/// Canonical, provider-agnostic job offer produced by a provider adapter.
///
/// `external_id` is provider-qualified (e.g. `adzuna_12345`) so it stays
/// unique per source. Company, location and description always carry a value;
/// adapters substitute explicit placeholders when the provider omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub external_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub contract: Option<String>,
    pub description: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub match_score: i32,
}

impl Listing {
    /// Deduplication key: same title at the same company counts as the same
    /// offer regardless of which provider surfaced it.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}_{}",
            self.title.to_lowercase(),
            self.company.to_lowercase()
        )
    }
}
