//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD and filtered listing over the `tasks` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Listing is always restricted to one owner.
//! - Exact-match filters (`status`, `priority`) are bound SQL parameters; the
//!   free-text filter runs as a literal matcher over the owner's rows.
//! - Results are ordered newest first by `created_at`, insertion order
//!   breaking ties.
//! - `owner_id` and `created_at` are never written by `update_task`.

use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::model::user::UserId;
use crate::repo::{ensure_schema, parse_millis, parse_uuid, RepoError, RepoResult};
use crate::search::LiteralSearch;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    description,
    priority,
    status,
    due_date,
    created_at,
    updated_at
FROM tasks";

const TASK_COLUMNS: &[&str] = &[
    "id",
    "owner_id",
    "title",
    "description",
    "priority",
    "status",
    "due_date",
    "created_at",
    "updated_at",
];

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Owner-scoped list query produced by the filter engine.
#[derive(Debug, Clone)]
pub struct TaskListQuery {
    pub owner: UserId,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: Option<LiteralSearch>,
}

impl TaskListQuery {
    /// Unfiltered listing of everything `owner` has.
    pub fn for_owner(owner: UserId) -> Self {
        Self {
            owner,
            status: None,
            priority: None,
            search: None,
        }
    }
}

/// Repository interface for task persistence.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for foreign schemas.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn, "tasks", TASK_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                id,
                owner_id,
                title,
                description,
                priority,
                status,
                due_date,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.to_string(),
                task.owner.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                task.priority.as_str(),
                task.status.as_str(),
                task.due_date.map(format_due_date),
                task.created_at.timestamp_millis(),
                task.updated_at.timestamp_millis(),
            ],
        )?;

        Ok(task.id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE owner_id = ?");
        let mut bind_values = vec![Value::Text(query.owner.to_string())];

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(priority) = query.priority {
            sql.push_str(" AND priority = ?");
            bind_values.push(Value::Text(priority.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, rowid DESC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            let task = parse_task_row(row)?;
            let keep = query
                .search
                .as_ref()
                .map_or(true, |search| search.matches_task(&task));
            if keep {
                tasks.push(task);
            }
        }

        Ok(tasks)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                priority = ?3,
                status = ?4,
                due_date = ?5,
                updated_at = ?6
             WHERE id = ?7 AND owner_id = ?8;",
            params![
                task.title.as_str(),
                task.description.as_deref(),
                task.priority.as_str(),
                task.status.as_str(),
                task.due_date.map(format_due_date),
                task.updated_at.timestamp_millis(),
                task.id.to_string(),
                task.owner.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }

        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let owner_text: String = row.get("owner_id")?;

    let priority_text: String = row.get("priority")?;
    let priority = TaskPriority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid priority `{priority_text}` in tasks.priority"))
    })?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in tasks.status"))
    })?;

    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(value) => Some(
            NaiveDate::parse_from_str(&value, DUE_DATE_FORMAT).map_err(|_| {
                RepoError::InvalidData(format!("invalid date `{value}` in tasks.due_date"))
            })?,
        ),
        None => None,
    };

    let task = Task {
        id: parse_uuid(&id_text, "tasks.id")?,
        owner: parse_uuid(&owner_text, "tasks.owner_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        status,
        due_date,
        created_at: parse_millis(row.get("created_at")?, "tasks.created_at")?,
        updated_at: parse_millis(row.get("updated_at")?, "tasks.updated_at")?,
    };
    task.validate()?;
    Ok(task)
}

fn format_due_date(date: NaiveDate) -> String {
    date.format(DUE_DATE_FORMAT).to_string()
}
