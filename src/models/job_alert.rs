use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A saved search specification with a re-check cadence.
///
/// `last_check` is written only by the alert processor; `active` can be
/// toggled by the user at any time and is re-read before every run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobAlert {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub keywords: Vec<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub salary: Option<String>,
    pub contract: Option<String>,
    pub frequency: String,
    pub active: bool,
    pub last_check: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
