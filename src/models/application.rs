use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const APPLICATION_TYPES: &[&str] = &["internship", "job"];
pub const APPLICATION_STATUSES: &[&str] = &["applied", "interview", "rejected", "accepted"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub company: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub application_date: DateTime<Utc>,
    pub interview_date: Option<DateTime<Utc>>,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub job_url: Option<String>,
    pub salary: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
