//! Task use-case service.
//!
//! # Responsibility
//! - Expose create/list/get/update/delete for one authenticated caller.
//! - Route every access-by-id through the ownership guard.
//! - Translate list parameters into an owner-scoped store query.
//!
//! # Invariants
//! - The guard runs before any mutation reaches the repository.
//! - `owner`, `id` and `created_at` are never altered after creation.
//! - `updated_at` strictly increases on every successful update.

use crate::access::{resolve, AccessError, TaskAction};
use crate::model::task::{
    normalize_description, CreateTaskInput, Task, TaskId, TaskPriority, TaskStatus,
    TaskValidationError, UpdateTaskInput,
};
use crate::model::user::Caller;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::RepoError;
use crate::search::{LiteralSearch, SearchError};
use log::{debug, info, warn};
use std::borrow::Borrow;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Missing or invalid input field.
    Validation(String),
    NotFound(TaskId),
    Forbidden(AccessError),
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::NotFound(_) => write!(f, "Task not found"),
            Self::Forbidden(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent task state: {details}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Forbidden(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<AccessError> for TaskServiceError {
    fn from(value: AccessError) -> Self {
        match value {
            AccessError::NotFound(id) => Self::NotFound(id),
            forbidden @ AccessError::Forbidden { .. } => Self::Forbidden(forbidden),
        }
    }
}

impl From<SearchError> for TaskServiceError {
    fn from(value: SearchError) -> Self {
        Self::Validation(value.to_string())
    }
}

/// Optional list parameters; all present filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: Option<String>,
}

impl TaskListFilter {
    /// Compiles this filter into a store query scoped to `caller`.
    pub fn to_query(&self, caller: &Caller) -> Result<TaskListQuery, TaskServiceError> {
        let search = match self.search.as_deref() {
            Some(term) => LiteralSearch::new(term)?,
            None => None,
        };
        Ok(TaskListQuery {
            owner: caller.user_id,
            status: self.status,
            priority: self.priority,
            search,
        })
    }
}

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a task owned by `caller`.
    ///
    /// # Contract
    /// - Title is trimmed; missing or blank titles fail validation.
    /// - Status starts as `pending`; priority defaults to `medium`.
    pub fn create_task(
        &self,
        caller: &Caller,
        input: CreateTaskInput,
    ) -> Result<Task, TaskServiceError> {
        let title = input.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(TaskServiceError::Validation(
                TaskValidationError::EmptyTitle.to_string(),
            ));
        }

        let mut task = Task::new(caller.user_id, title);
        task.description = normalize_description(input.description);
        task.priority = input.priority.unwrap_or_default();
        task.due_date = input.due_date;

        let task_id = self.repo.create_task(&task)?;
        info!("event=task_create module=service status=ok task_id={task_id}");

        self.repo
            .get_task(task_id)?
            .ok_or(TaskServiceError::InconsistentState(
                "created task not found in read-back",
            ))
    }

    /// Lists the caller's tasks, newest first.
    pub fn list_tasks(
        &self,
        caller: &Caller,
        filter: &TaskListFilter,
    ) -> Result<Vec<Task>, TaskServiceError> {
        let query = filter.to_query(caller)?;
        let tasks = self.repo.list_tasks(&query)?;
        debug!(
            "event=task_list module=service status=ok count={} status_filter={} priority_filter={} search={}",
            tasks.len(),
            query.status.map_or("-", TaskStatus::as_str),
            query.priority.map_or("-", TaskPriority::as_str),
            query.search.is_some()
        );
        Ok(tasks)
    }

    /// Gets one task the caller owns.
    pub fn get_task(&self, caller: &Caller, task_id: TaskId) -> Result<Task, TaskServiceError> {
        self.owned_task(caller, task_id, TaskAction::Read)
    }

    /// Merges `input` into the caller's task and persists it.
    pub fn update_task(
        &self,
        caller: &Caller,
        task_id: TaskId,
        input: &UpdateTaskInput,
    ) -> Result<Task, TaskServiceError> {
        self.update_task_with(caller, task_id, || Ok(input))
    }

    /// Like [`TaskService::update_task`], but `decode` only runs once the
    /// guard has passed: missing and foreign tasks answer not-found or
    /// forbidden whatever the patch contains.
    ///
    /// A decode failure becomes [`TaskServiceError::Validation`].
    pub fn update_task_with<P, F>(
        &self,
        caller: &Caller,
        task_id: TaskId,
        decode: F,
    ) -> Result<Task, TaskServiceError>
    where
        P: Borrow<UpdateTaskInput>,
        F: FnOnce() -> Result<P, String>,
    {
        let mut task = self.owned_task(caller, task_id, TaskAction::Update)?;
        let input = decode().map_err(TaskServiceError::Validation)?;
        input.borrow().apply_to(&mut task);
        task.touch();

        self.repo.update_task(&task)?;
        info!("event=task_update module=service status=ok task_id={task_id}");

        self.repo
            .get_task(task_id)?
            .ok_or(TaskServiceError::InconsistentState(
                "updated task not found in read-back",
            ))
    }

    /// Permanently removes the caller's task.
    pub fn delete_task(&self, caller: &Caller, task_id: TaskId) -> Result<(), TaskServiceError> {
        self.owned_task(caller, task_id, TaskAction::Delete)?;
        self.repo.delete_task(task_id)?;
        info!("event=task_delete module=service status=ok task_id={task_id}");
        Ok(())
    }

    fn owned_task(
        &self,
        caller: &Caller,
        task_id: TaskId,
        action: TaskAction,
    ) -> Result<Task, TaskServiceError> {
        let found = self.repo.get_task(task_id)?;
        resolve(found, task_id, caller, action).map_err(|err| {
            if let AccessError::Forbidden { .. } = err {
                warn!(
                    "event=task_access module=service status=denied task_id={task_id} action={}",
                    action.verb()
                );
            }
            TaskServiceError::from(err)
        })
    }
}
