//! Shared request state: one SQLite connection behind a mutex.
//!
//! # Invariants
//! - SQLite work only runs on the blocking pool, never on async workers.
//! - Each service call holds the connection for exactly one operation.

use crate::error::ApiError;
use chrono::Duration;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;
use taskflow_core::{
    AuthError, AuthService, SqliteTaskRepository, SqliteUserRepository, TaskService,
    TaskServiceError,
};

/// Cloneable handle to the task database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Wraps a connection already returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `work` with exclusive access to the connection on the blocking pool.
    pub async fn call<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            work(&guard)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("database task failed: {err}")))?
    }
}

#[derive(Clone)]
pub struct AppState {
    db: Database,
    session_ttl: Duration,
}

impl AppState {
    pub fn new(conn: Connection, session_ttl: Duration) -> Self {
        Self {
            db: Database::new(conn),
            session_ttl,
        }
    }

    /// Runs one task use-case against a fresh repository borrow.
    pub async fn with_tasks<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&TaskService<SqliteTaskRepository<'c>>) -> Result<T, TaskServiceError>
            + Send
            + 'static,
    {
        self.db
            .call(move |conn| {
                let service = TaskService::new(SqliteTaskRepository::try_new(conn)?);
                work(&service).map_err(ApiError::from)
            })
            .await
    }

    /// Runs one authentication use-case.
    pub async fn with_auth<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&AuthService<SqliteUserRepository<'c>>) -> Result<T, AuthError>
            + Send
            + 'static,
    {
        let session_ttl = self.session_ttl;
        self.db
            .call(move |conn| {
                let service = AuthService::with_session_ttl(
                    SqliteUserRepository::try_new(conn)?,
                    session_ttl,
                );
                work(&service).map_err(ApiError::from)
            })
            .await
    }
}
