//! `/api/tasks` handlers.
//!
//! Every handler requires an authenticated caller; access-by-id goes
//! through the service's ownership guard. Update bodies are only decoded
//! after that guard, so a foreign or missing task never reports field errors.

use crate::error::{ApiError, INVALID_BODY_MESSAGE};
use crate::extract::{AppJson, AppPath, AppQuery, AuthenticatedCaller};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use taskflow_core::{
    CreateTaskInput, MessageEnvelope, TaskEnvelope, TaskId, TaskListEnvelope, TaskListFilter,
    TaskPriority, TaskStatus, UpdateTaskInput,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/{id}", get(get_task).put(update_task).delete(delete_task))
}

/// Raw list parameters; empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

impl TaskListParams {
    pub fn into_filter(self) -> Result<TaskListFilter, ApiError> {
        let status = match non_empty(self.status) {
            Some(raw) => Some(TaskStatus::parse(&raw).ok_or_else(|| {
                ApiError::Validation(format!(
                    "Invalid status `{raw}`; expected pending, in-progress or completed"
                ))
            })?),
            None => None,
        };
        let priority = match non_empty(self.priority) {
            Some(raw) => Some(TaskPriority::parse(&raw).ok_or_else(|| {
                ApiError::Validation(format!(
                    "Invalid priority `{raw}`; expected low, medium or high"
                ))
            })?),
            None => None,
        };

        Ok(TaskListFilter {
            status,
            priority,
            search: non_empty(self.search),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

fn decode_task_patch(body: Value) -> Result<UpdateTaskInput, String> {
    serde_json::from_value(body).map_err(|err| {
        debug!(
            "event=http_reject module=api status=error kind=task_patch category={:?}",
            err.classify()
        );
        INVALID_BODY_MESSAGE.to_string()
    })
}

/// No stored task can carry a non-UUID id, so malformed ids are not found.
fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    TaskId::parse_str(raw.trim()).map_err(|_| ApiError::task_not_found())
}

async fn create_task(
    State(state): State<AppState>,
    AuthenticatedCaller { caller, .. }: AuthenticatedCaller,
    AppJson(input): AppJson<CreateTaskInput>,
) -> Result<(StatusCode, AppJson<TaskEnvelope>), ApiError> {
    let task = state
        .with_tasks(move |tasks| tasks.create_task(&caller, input))
        .await?;
    Ok((StatusCode::CREATED, AppJson(TaskEnvelope::new(task))))
}

async fn list_tasks(
    State(state): State<AppState>,
    AuthenticatedCaller { caller, .. }: AuthenticatedCaller,
    AppQuery(params): AppQuery<TaskListParams>,
) -> Result<AppJson<TaskListEnvelope>, ApiError> {
    let filter = params.into_filter()?;
    let tasks = state
        .with_tasks(move |tasks| tasks.list_tasks(&caller, &filter))
        .await?;
    Ok(AppJson(TaskListEnvelope::new(tasks)))
}

async fn get_task(
    State(state): State<AppState>,
    AuthenticatedCaller { caller, .. }: AuthenticatedCaller,
    AppPath(id): AppPath<String>,
) -> Result<AppJson<TaskEnvelope>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let task = state
        .with_tasks(move |tasks| tasks.get_task(&caller, task_id))
        .await?;
    Ok(AppJson(TaskEnvelope::new(task)))
}

async fn update_task(
    State(state): State<AppState>,
    AuthenticatedCaller { caller, .. }: AuthenticatedCaller,
    AppPath(id): AppPath<String>,
    AppJson(body): AppJson<Value>,
) -> Result<AppJson<TaskEnvelope>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let task = state
        .with_tasks(move |tasks| {
            tasks.update_task_with(&caller, task_id, || decode_task_patch(body))
        })
        .await?;
    Ok(AppJson(TaskEnvelope::new(task)))
}

async fn delete_task(
    State(state): State<AppState>,
    AuthenticatedCaller { caller, .. }: AuthenticatedCaller,
    AppPath(id): AppPath<String>,
) -> Result<AppJson<MessageEnvelope>, ApiError> {
    let task_id = parse_task_id(&id)?;
    state
        .with_tasks(move |tasks| tasks.delete_task(&caller, task_id))
        .await?;
    Ok(AppJson(MessageEnvelope::ok("Task deleted successfully")))
}
