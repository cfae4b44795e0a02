use crate::task::{Task, TaskService, TaskServiceError};
use crate::web::ErrorResponse;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared state for the task endpoints.
#[derive(Clone)]
pub struct TaskState {
    pub db: Arc<DatabaseConnection>,
}

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    id: i32,
    /// The task description
    description: String,
    /// Whether the task has been completed
    completed: bool,
    /// When the task was created
    created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            description: task.description().to_string(),
            completed: task.completed(),
            created_at: task.created_at(),
        }
    }
}

/// JSON request payload carrying a task description.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskPayload {
    /// The task description
    pub task: String,
}

/// API response for operations that return the affected task.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    /// Human-readable outcome message
    message: String,
    /// The created or updated task
    task: TaskJson,
}

/// API response for operations that return only a confirmation.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable outcome message
    message: String,
}

/// Custom error type for task handler operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskApiError {
    /// Represents a request that failed validation before any store interaction.
    #[error("{0}")]
    Validation(String),
    /// Represents a task service error.
    #[error(transparent)]
    Service(#[from] TaskServiceError),
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, message) = match self {
            TaskApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            TaskApiError::Service(TaskServiceError::TaskNotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("Task with ID {} not found", id))
            }
            TaskApiError::Service(err) => {
                tracing::error!("Task store operation failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request".to_string(),
                )
            }
        };

        (status_code, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Extracts a non-empty description from the request payload, rejecting
/// missing bodies, malformed JSON, and blank descriptions alike.
fn require_description(
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<String, TaskApiError> {
    let Ok(Json(TaskPayload { task })) = payload else {
        return Err(TaskApiError::Validation(
            "Task description is required".to_string(),
        ));
    };
    if task.trim().is_empty() {
        return Err(TaskApiError::Validation(
            "Task description is required".to_string(),
        ));
    }
    Ok(task)
}

/// Handler for GET /tasks - Returns all tasks, newest first.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = Vec<TaskJson>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(
    State(state): State<Arc<TaskState>>,
) -> Result<Json<Vec<TaskJson>>, TaskApiError> {
    let service = TaskService::new(&state.db);
    let tasks = service.get_all_tasks().await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for POST /tasks - Creates a new task.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = TaskPayload,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Missing or empty task description", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn add_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), TaskApiError> {
    let description = require_description(payload)?;
    let service = TaskService::new(&state.db);
    let task = service.create_task(description).await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "Task added successfully".to_string(),
            task: TaskJson::from(task),
        }),
    ))
}

/// Handler for PUT /tasks/{id}/toggle - Flips a task's completion status.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/tasks/{id}/toggle",
    params(
        ("id" = i32, Path, description = "ID of the task to toggle")
    ),
    responses(
        (status = 200, description = "Task status updated", body = TaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn toggle_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
) -> Result<Json<TaskResponse>, TaskApiError> {
    let service = TaskService::new(&state.db);
    let task = service.toggle_task_by_id(id).await?;

    Ok(Json(TaskResponse {
        message: "Task status updated".to_string(),
        task: TaskJson::from(task),
    }))
}

/// Handler for PUT /tasks/{id} - Replaces a task's description.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(
        ("id" = i32, Path, description = "ID of the task to update")
    ),
    request_body = TaskPayload,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Missing or empty task description", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<TaskResponse>, TaskApiError> {
    let description = require_description(payload)?;
    let service = TaskService::new(&state.db);
    let task = service.update_task_by_id(id, description).await?;

    Ok(Json(TaskResponse {
        message: "Task updated successfully".to_string(),
        task: TaskJson::from(task),
    }))
}

/// Handler for DELETE /tasks/{id} - Permanently removes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(
        ("id" = i32, Path, description = "ID of the task to delete")
    ),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, TaskApiError> {
    let service = TaskService::new(&state.db);
    service.delete_task_by_id(id).await?;

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// Creates and returns the tasks API router.
pub fn create_task_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(get_tasks_handler).post(add_task_handler))
        .route(
            "/tasks/{id}",
            put(update_task_handler).delete(delete_task_handler),
        )
        .route("/tasks/{id}/toggle", put(toggle_task_handler))
        .with_state(state)
}
