//! Core domain logic for TaskFlow.
//! This crate is the single source of truth for task ownership and query
//! invariants; the HTTP server and the dashboard client build on it.

pub mod access;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use access::{authorize, AccessError, TaskAction};
pub use logging::{init_logging, logging_status, LogLevel, LogSpec, LogTarget, LoggingError};
pub use model::envelope::{
    HealthEnvelope, MessageEnvelope, SessionEnvelope, TaskEnvelope, TaskListEnvelope,
    UserEnvelope,
};
pub use model::task::{
    CreateTaskInput, Task, TaskId, TaskPriority, TaskStatus, TaskValidationError,
    UpdateTaskInput,
};
pub use model::user::{Caller, IssuedSession, LoginInput, RegisterInput, User, UserId};
pub use repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use search::{LiteralSearch, SearchError};
pub use service::auth_service::{AuthError, AuthService};
pub use service::task_service::{TaskListFilter, TaskService, TaskServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
