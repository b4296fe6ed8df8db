use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job_offer::JobOfferListItem;
use crate::services::job_search_service::ApiStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct JobOfferListQuery {
    pub alert_id: Option<Uuid>,
    pub source: Option<String>,
    pub is_read: Option<bool>,
    pub is_saved: Option<bool>,
    pub min_score: Option<i32>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobOfferListResponse {
    pub offers: Vec<JobOfferListItem>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateJobOfferStatusPayload {
    pub is_read: Option<bool>,
    pub is_saved: Option<bool>,
    pub is_applied: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceStat {
    pub source: String,
    pub count: i64,
    pub avg_score: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobOfferStats {
    pub total: i64,
    pub read: i64,
    pub saved: i64,
    pub applied: i64,
    pub recent_offers: i64,
    pub by_source: Vec<SourceStat>,
    pub api_status: ApiStatus,
}
