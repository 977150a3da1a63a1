//! JSON response envelopes shared by the HTTP server and its clients.
//!
//! Every body carries `success`; failures are a [`MessageEnvelope`] with
//! `success == false`.

use super::task::Task;
use super::user::{IssuedSession, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// Single task body for create/get/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub success: bool,
    pub task: Task,
}

impl TaskEnvelope {
    pub fn new(task: Task) -> Self {
        Self {
            success: true,
            task,
        }
    }
}

/// List body; `count` always equals `tasks.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListEnvelope {
    pub success: bool,
    pub count: usize,
    pub tasks: Vec<Task>,
}

impl TaskListEnvelope {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            success: true,
            count: tasks.len(),
            tasks,
        }
    }
}

/// Confirmation or failure message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

impl MessageEnvelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Register/login body carrying a fresh bearer token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEnvelope {
    pub success: bool,
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedSession> for SessionEnvelope {
    fn from(value: IssuedSession) -> Self {
        Self {
            success: true,
            token: value.token,
            user: value.user,
            expires_at: value.expires_at,
        }
    }
}

impl Debug for SessionEnvelope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEnvelope")
            .field("success", &self.success)
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub success: bool,
    pub user: User,
}

impl UserEnvelope {
    pub fn new(user: User) -> Self {
        Self {
            success: true,
            user,
        }
    }
}

/// Liveness probe body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthEnvelope {
    pub success: bool,
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::{MessageEnvelope, TaskListEnvelope};
    use crate::model::task::Task;
    use uuid::Uuid;

    #[test]
    fn list_count_tracks_tasks() {
        let owner = Uuid::new_v4();
        let envelope = TaskListEnvelope::new(vec![Task::new(owner, "a"), Task::new(owner, "b")]);
        assert_eq!(envelope.count, 2);

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["tasks"][0]["status"], "pending");
        assert!(json["tasks"][0].get("createdAt").is_some());
    }

    #[test]
    fn failure_envelope_shape() {
        let json = serde_json::to_value(MessageEnvelope::failure("Task not found")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "message": "Task not found" })
        );
    }
}
