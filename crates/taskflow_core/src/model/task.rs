//! Task domain model and validated request shapes.
//!
//! # Responsibility
//! - Define the canonical `Task` record and its enumerated fields.
//! - Define the explicit input schemas accepted by create and update.
//!
//! # Invariants
//! - `title` is never empty or whitespace-only once validated.
//! - `owner`, `id` and `created_at` are never touched by an update.
//! - `updated_at` is never earlier than `created_at`, and strictly increases
//!   on every `touch`.

use super::timestamp_now;
use super::user::UserId;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Store-assigned task identifier.
pub type TaskId = Uuid;

/// Task urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Wire and storage spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses the exact wire spelling; anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.as_str() == value)
    }
}

/// Task progress state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Created but not started.
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Wire and storage spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Parses the exact wire spelling; anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.as_str() == value)
    }
}

impl Display for TaskPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical task record, serialized with camelCase field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// Calendar date only; no time-of-day semantics.
    pub due_date: Option<NaiveDate>,
    /// Set once from the creating caller.
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending, medium-priority task with a fresh id.
    ///
    /// Does not validate; stores call [`Task::validate`] before writing.
    pub fn new(owner: UserId, title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), owner, title)
    }

    /// Creates a task with a caller-provided id.
    pub fn with_id(id: TaskId, owner: UserId, title: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id,
            title: title.into(),
            description: None,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            due_date: None,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.updated_at < self.created_at {
            return Err(TaskValidationError::UpdatedBeforeCreated);
        }
        Ok(())
    }

    /// Refreshes `updated_at`, guaranteeing a strictly later value.
    pub fn touch(&mut self) {
        let now = timestamp_now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::milliseconds(1)
        };
    }
}

/// Record-level validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    UpdatedBeforeCreated,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Please provide a task title"),
            Self::UpdatedBeforeCreated => {
                write!(f, "task updatedAt must not be earlier than createdAt")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Body accepted by task creation.
///
/// `title` is optional at the wire level so a missing title surfaces as the
/// same validation error as a blank one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_due_date"
    )]
    pub due_date: Option<NaiveDate>,
}

impl CreateTaskInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Partial update body.
///
/// Absent fields keep their value. `description` and `dueDate` distinguish
/// "absent" (`None`) from "cleared with null" (`Some(None)`). Fields outside
/// this shape (`id`, `owner`, timestamps) are ignored on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "patch_field"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "patch_due_date"
    )]
    pub due_date: Option<Option<NaiveDate>>,
}

impl UpdateTaskInput {
    /// Merges provided fields into `task`. Identity fields are untouched.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = normalize_description(description.clone());
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

/// Blank descriptions are stored as absent.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|value| !value.trim().is_empty())
}

/// Parses `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its date.
pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}

fn optional_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_due_date(&raw)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("invalid dueDate `{raw}`, expected YYYY-MM-DD")))
}

fn patch_due_date<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_due_date(deserializer).map(Some)
}

fn patch_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::{parse_due_date, Task, TaskPriority, TaskStatus, UpdateTaskInput};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn defaults_match_new_task_contract() {
        let task = Task::new(Uuid::new_v4(), "Buy milk");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.created_at, task.updated_at);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn wire_spellings_parse_back() {
        assert_eq!(
            TaskStatus::parse("in-progress"),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(TaskStatus::parse("in_progress"), None);
        assert_eq!(TaskPriority::parse("HIGH"), None);
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
    }

    #[test]
    fn touch_strictly_increases_updated_at() {
        let mut task = Task::new(Uuid::new_v4(), "t");
        let mut previous = task.updated_at;
        for _ in 0..5 {
            task.touch();
            assert!(task.updated_at > previous);
            previous = task.updated_at;
        }
    }

    #[test]
    fn due_date_accepts_date_and_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(parse_due_date("2025-03-09"), Some(expected));
        assert_eq!(parse_due_date("2025-03-09T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_due_date("next tuesday"), None);
    }

    #[test]
    fn update_input_distinguishes_absent_from_null() {
        let absent: UpdateTaskInput = serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        assert_eq!(absent.description, None);
        assert_eq!(absent.due_date, None);

        let cleared: UpdateTaskInput =
            serde_json::from_str(r#"{"description":null,"dueDate":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert_eq!(cleared.due_date, Some(None));
    }

    #[test]
    fn update_input_ignores_identity_fields() {
        let owner = Uuid::new_v4();
        let mut task = Task::new(owner, "original");
        let before = task.clone();
        let input: UpdateTaskInput = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "owner": Uuid::new_v4(),
            "createdAt": "1999-01-01T00:00:00Z",
            "title": "  renamed  "
        }))
        .unwrap();

        input.apply_to(&mut task);
        assert_eq!(task.title, "renamed");
        assert_eq!(task.id, before.id);
        assert_eq!(task.owner, owner);
        assert_eq!(task.created_at, before.created_at);
    }

    #[test]
    fn update_input_rejects_unknown_enum_values() {
        let result = serde_json::from_str::<UpdateTaskInput>(r#"{"priority":"urgent"}"#);
        assert!(result.is_err());
    }
}
