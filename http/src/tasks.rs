//! Task CRUD handlers
//!
//! Every handler here sits behind bearer-token authentication; the
//! [`AuthUser`] argument rejects unauthenticated requests before the handler
//! body runs. Persistence goes through the [`TaskRepository`] trait so the
//! routes never know which backend they are talking to.
//!
//! [`TaskRepository`]: taskd_core::repository::TaskRepository

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use taskd_core::{
    error::TaskError,
    models::{NewTask, Task, UpdateTask},
    validation::TaskValidator,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

/// `GET /api/v1/tasks`: list every task in insertion order.
pub async fn list_tasks(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.tasks.get_all().await?;
    tracing::debug!(username = %user.username, count = tasks.len(), "Listed tasks");
    Ok(Json(tasks))
}

/// `GET /api/v1/tasks/:id`: fetch one task or 404.
pub async fn get_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .tasks
        .get_by_id(id)
        .await?
        .ok_or_else(|| TaskError::not_found_id(id))?;
    tracing::debug!(username = %user.username, task_id = id, "Fetched task");
    Ok(Json(task))
}

/// `POST /api/v1/tasks`: create a task from a validated payload.
///
/// Responds 201 with the stored task, identifier and timestamps included.
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<NewTask>,
) -> Result<impl IntoResponse, ApiError> {
    TaskValidator::validate_new_task(&input)?;

    let saved = state.tasks.save(Task::new(input)).await?;
    tracing::info!(
        username = %user.username,
        task_id = saved.id,
        title = %saved.title,
        "Created task"
    );
    Ok((StatusCode::CREATED, Json(saved)))
}

/// `PUT /api/v1/tasks/:id`: apply a partial update to an existing task.
///
/// Absent fields keep their stored values. Targeting a missing task is 404,
/// same as a fetch.
pub async fn update_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(update): Json<UpdateTask>,
) -> Result<Json<Task>, ApiError> {
    TaskValidator::validate_update(&update)?;

    let mut task = state
        .tasks
        .get_by_id(id)
        .await?
        .ok_or_else(|| TaskError::not_found_id(id))?;
    task.apply(update);

    let saved = state.tasks.save(task).await?;
    tracing::info!(username = %user.username, task_id = id, "Updated task");
    Ok(Json(saved))
}

/// `DELETE /api/v1/tasks/:id`: remove a task or 404.
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.tasks.delete(id).await?;
    tracing::info!(username = %user.username, task_id = id, "Deleted task");
    Ok(Json(json!({ "message": "Task deleted successfully" })))
}
