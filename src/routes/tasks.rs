use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::task_dto::{CreateTaskPayload, TaskListQuery, TaskListResponse, TaskStats, UpdateTaskPayload},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/tasks",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("priority" = Option<String>, Query, description = "Filter by priority"),
        ("search" = Option<String>, Query, description = "Search in title and description")
    ),
    responses(
        (status = 200, description = "List of tasks", body = Json<TaskListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TaskListQuery>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let tasks = state.task_service.list_tasks(user_id, &query).await?;
    let count = tasks.len();
    Ok(Json(TaskListResponse { tasks, count }))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found"),
        (status = 404, description = "Task not found")
    )
)]
#[axum::debug_handler]
pub async fn get_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let task = state.task_service.get_task(user_id, id).await?;
    Ok(Json(task))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskPayload,
    responses(
        (status = 201, description = "Task created"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    let task = state.task_service.create_task(user_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = UpdateTaskPayload,
    responses(
        (status = 200, description = "Task updated"),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Task not found")
    )
)]
#[axum::debug_handler]
pub async fn update_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    let task = state.task_service.update_task(user_id, id, &payload).await?;
    Ok(Json(task))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    state.task_service.delete_task(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/tasks/stats",
    responses(
        (status = 200, description = "Task counters per status", body = Json<TaskStats>)
    )
)]
#[axum::debug_handler]
pub async fn task_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let stats = state.task_service.task_stats(user_id).await?;
    Ok(Json(stats))
}
