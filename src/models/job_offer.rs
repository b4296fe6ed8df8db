use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted form of a discovered listing. `(external_id, source)` is the
/// natural key; rediscovery updates the row instead of duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobOffer {
    pub id: Uuid,
    pub external_id: String,
    pub source: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub contract: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub match_score: i32,
    pub is_read: bool,
    pub is_saved: bool,
    pub is_applied: bool,
    pub alert_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Offer row joined with the owning alert's title, for list views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobOfferListItem {
    pub id: Uuid,
    pub external_id: String,
    pub source: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub contract: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub match_score: i32,
    pub is_read: bool,
    pub is_saved: bool,
    pub is_applied: bool,
    pub alert_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub alert_title: Option<String>,
}
