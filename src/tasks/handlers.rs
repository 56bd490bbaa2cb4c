use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthSession,
    error::AppError,
    state::AppState,
    tasks::{
        dto::{
            CreateTaskRequest, ListTasksQuery, MessageResponse, TaskResponse, TasksResponse,
            UpdateTaskRequest,
        },
        services::task_not_found,
    },
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", put(update_task).delete(delete_task))
}

/// Malformed ids are indistinguishable from missing ones.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| task_not_found())
}

#[instrument(skip(state, session, query))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> Result<Json<TasksResponse>, AppError> {
    let Query(query) = query?;
    let tasks = state.tasks.list(&session, query.month_filter()?).await?;
    Ok(Json(TasksResponse { tasks }))
}

#[instrument(skip(state, session, body))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), AppError> {
    let Json(payload) = body?;
    let task = state.tasks.create(&session, payload.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            task,
            message: "task created",
        }),
    ))
}

#[instrument(skip(state, session, id, body))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, AppError> {
    let Path(id) = id?;
    let task_id = parse_task_id(&id)?;
    let Json(payload) = body?;
    let task = state.tasks.update(&session, task_id, payload.into()).await?;
    Ok(Json(TaskResponse {
        task,
        message: "task updated",
    }))
}

#[instrument(skip(state, session, id))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = id?;
    let task_id = parse_task_id(&id)?;
    state.tasks.delete(&session, task_id).await?;
    Ok(Json(MessageResponse {
        message: "task deleted",
    }))
}
