use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::offer_dto::{
        JobOfferListQuery, JobOfferListResponse, JobOfferStats, UpdateJobOfferStatusPayload,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/job-offers",
    params(
        ("alert_id" = Option<Uuid>, Query, description = "Filter by alert"),
        ("source" = Option<String>, Query, description = "Filter by source"),
        ("is_read" = Option<bool>, Query, description = "Filter by read flag"),
        ("is_saved" = Option<bool>, Query, description = "Filter by saved flag"),
        ("min_score" = Option<i32>, Query, description = "Minimum match score"),
        ("limit" = Option<i64>, Query, description = "Max rows, capped at 50")
    ),
    responses(
        (status = 200, description = "List of job offers", body = Json<JobOfferListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_offers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<JobOfferListQuery>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let offers = state.offer_service.list_offers(user_id, &query).await?;
    let count = offers.len();
    Ok(Json(JobOfferListResponse { offers, count }))
}

#[utoipa::path(
    get,
    path = "/api/job-offers/{id}",
    params(
        ("id" = Uuid, Path, description = "Job offer ID")
    ),
    responses(
        (status = 200, description = "Job offer found"),
        (status = 404, description = "Job offer not found")
    )
)]
#[axum::debug_handler]
pub async fn get_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let offer = state.offer_service.get_offer(user_id, id).await?;
    Ok(Json(offer))
}

#[utoipa::path(
    patch,
    path = "/api/job-offers/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Job offer ID")
    ),
    request_body = UpdateJobOfferStatusPayload,
    responses(
        (status = 200, description = "Job offer status updated"),
        (status = 400, description = "Nothing to update"),
        (status = 404, description = "Job offer not found")
    )
)]
#[axum::debug_handler]
pub async fn update_offer_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobOfferStatusPayload>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let offer = state
        .offer_service
        .update_status(user_id, id, &payload)
        .await?;
    Ok(Json(offer))
}

#[utoipa::path(
    delete,
    path = "/api/job-offers/{id}",
    params(
        ("id" = Uuid, Path, description = "Job offer ID")
    ),
    responses(
        (status = 204, description = "Job offer deleted"),
        (status = 404, description = "Job offer not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    state.offer_service.delete_offer(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/job-offers/stats",
    responses(
        (status = 200, description = "Offer counters and provider status", body = Json<JobOfferStats>)
    )
)]
#[axum::debug_handler]
pub async fn offer_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let stats = state
        .offer_service
        .offer_stats(user_id, &state.job_search)
        .await?;
    Ok(Json(stats))
}

#[utoipa::path(
    post,
    path = "/api/job-offers/process/{alert_id}",
    params(
        ("alert_id" = Uuid, Path, description = "Job alert ID")
    ),
    responses(
        (status = 200, description = "Alert processed"),
        (status = 404, description = "Job alert not found")
    )
)]
#[axum::debug_handler]
pub async fn process_alert(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(alert_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    // Ownership check before touching the pipeline.
    state.alert_service.get_alert(user_id, alert_id).await?;
    let result = state.alert_processor.process_alert(alert_id).await;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/job-offers/process-all",
    responses(
        (status = 200, description = "Sweep over all due alerts")
    )
)]
#[axum::debug_handler]
pub async fn process_all(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let reports = state.alert_processor.process_all_alerts().await;
    Ok(Json(reports))
}
