use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::alert_dto::{
        CreateJobAlertPayload, JobAlertListQuery, JobAlertListResponse, JobAlertStats,
        UpdateJobAlertPayload,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/job-alerts",
    params(
        ("active" = Option<bool>, Query, description = "Filter by active flag")
    ),
    responses(
        (status = 200, description = "List of job alerts", body = Json<JobAlertListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_alerts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<JobAlertListQuery>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let job_alerts = state.alert_service.list_alerts(user_id, &query).await?;
    let count = job_alerts.len();
    Ok(Json(JobAlertListResponse { job_alerts, count }))
}

#[utoipa::path(
    get,
    path = "/api/job-alerts/{id}",
    params(
        ("id" = Uuid, Path, description = "Job alert ID")
    ),
    responses(
        (status = 200, description = "Job alert found"),
        (status = 404, description = "Job alert not found")
    )
)]
#[axum::debug_handler]
pub async fn get_alert(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let alert = state.alert_service.get_alert(user_id, id).await?;
    Ok(Json(alert))
}

#[utoipa::path(
    post,
    path = "/api/job-alerts",
    request_body = CreateJobAlertPayload,
    responses(
        (status = 201, description = "Job alert created"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_alert(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateJobAlertPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    let alert = state.alert_service.create_alert(user_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}

#[utoipa::path(
    patch,
    path = "/api/job-alerts/{id}",
    params(
        ("id" = Uuid, Path, description = "Job alert ID")
    ),
    request_body = UpdateJobAlertPayload,
    responses(
        (status = 200, description = "Job alert updated"),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Job alert not found")
    )
)]
#[axum::debug_handler]
pub async fn update_alert(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobAlertPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    let alert = state
        .alert_service
        .update_alert(user_id, id, &payload)
        .await?;
    Ok(Json(alert))
}

#[utoipa::path(
    delete,
    path = "/api/job-alerts/{id}",
    params(
        ("id" = Uuid, Path, description = "Job alert ID")
    ),
    responses(
        (status = 204, description = "Job alert deleted"),
        (status = 404, description = "Job alert not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_alert(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    state.alert_service.delete_alert(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/job-alerts/stats",
    responses(
        (status = 200, description = "Alert counters", body = Json<JobAlertStats>)
    )
)]
#[axum::debug_handler]
pub async fn alert_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let stats = state.alert_service.alert_stats(user_id).await?;
    Ok(Json(stats))
}
