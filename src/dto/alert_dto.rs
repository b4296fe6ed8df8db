use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::job_alert::JobAlert;

pub const ALERT_FREQUENCIES: &[&str] = &["daily", "weekly"];

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobAlertPayload {
    #[validate(length(min = 1))]
    pub title: String,
    pub keywords: Vec<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub salary: Option<String>,
    pub contract: Option<String>,
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateJobAlertPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub salary: Option<String>,
    pub contract: Option<String>,
    pub frequency: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobAlertListQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobAlertListResponse {
    pub job_alerts: Vec<JobAlert>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobAlertStats {
    pub active: i64,
    pub inactive: i64,
    pub total: i64,
}
