//! Ownership guard for access-by-id task operations.
//!
//! # Responsibility
//! - Decide whether a caller may read or mutate one resolved task.
//! - Keep the not-found vs forbidden distinction in one place.
//!
//! # Invariants
//! - The guard has no side effects.
//! - Callers must run it before applying any mutation.
//! - An absent record is `NotFound`; a record owned by someone else is
//!   `Forbidden`. Ownership is never inferred from anything but `task.owner`.

use crate::model::task::{Task, TaskId};
use crate::model::user::Caller;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Operation the caller is attempting on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskAction {
    Read,
    Update,
    Delete,
}

impl TaskAction {
    /// Verb used in user-facing denial messages.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Read => "access",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Guard denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    NotFound(TaskId),
    Forbidden { task_id: TaskId, action: TaskAction },
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(_) => write!(f, "Task not found"),
            Self::Forbidden { action, .. } => {
                write!(f, "Not authorized to {} this task", action.verb())
            }
        }
    }
}

impl Error for AccessError {}

/// Returns the task when `caller` owns it.
pub fn authorize(task: Task, caller: &Caller, action: TaskAction) -> Result<Task, AccessError> {
    if task.owner != caller.user_id {
        return Err(AccessError::Forbidden {
            task_id: task.id,
            action,
        });
    }
    Ok(task)
}

/// Applies [`authorize`] to an optional store lookup for `task_id`.
pub fn resolve(
    found: Option<Task>,
    task_id: TaskId,
    caller: &Caller,
    action: TaskAction,
) -> Result<Task, AccessError> {
    let task = found.ok_or(AccessError::NotFound(task_id))?;
    authorize(task, caller, action)
}
