//! Dashboard view model: client-side filtering and summary statistics.
//!
//! The dashboard fetches the caller's full task list once and re-filters it
//! locally as the search box and selectors change, so no round trip is
//! needed per keystroke. The same selections can be sent to the server as a
//! [`TaskListFilter`].

use crate::client::TaskflowClient;
use crate::error::ClientError;
use crate::session::Session;
use serde::Serialize;
use taskflow_core::{Task, TaskListFilter, TaskPriority, TaskStatus};

/// Selector value meaning "no filter".
pub const ALL: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    pub search: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl DashboardFilter {
    /// Builds a filter from raw selector values, where `"all"` disables a
    /// selector.
    pub fn from_selection(search: &str, status: &str, priority: &str) -> Result<Self, ClientError> {
        let status = match status {
            ALL => None,
            other => Some(TaskStatus::parse(other).ok_or_else(|| {
                ClientError::Validation(format!("unknown status `{other}`"))
            })?),
        };
        let priority = match priority {
            ALL => None,
            other => Some(TaskPriority::parse(other).ok_or_else(|| {
                ClientError::Validation(format!("unknown priority `{other}`"))
            })?),
        };

        Ok(Self {
            search: search.to_string(),
            status,
            priority,
        })
    }

    /// Whitespace-only searches are no search, as on the server.
    pub fn has_search(&self) -> bool {
        !self.search.trim().is_empty()
    }

    /// Case-insensitive substring match on title or description, then exact
    /// status and priority.
    pub fn matches(&self, task: &Task) -> bool {
        if self.has_search() {
            let needle = self.search.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }

        self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
    }

    /// Visible tasks, keeping the server's ordering.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }

    pub fn to_server_filter(&self) -> TaskListFilter {
        TaskListFilter {
            status: self.status,
            priority: self.priority,
            search: self.has_search().then(|| self.search.clone()),
        }
    }
}

/// Counters shown above the task list; always over the unfiltered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl DashboardStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(
            Self {
                total: tasks.len(),
                ..Self::default()
            },
            |mut stats, task| {
                match task.status {
                    TaskStatus::Pending => stats.pending += 1,
                    TaskStatus::InProgress => stats.in_progress += 1,
                    TaskStatus::Completed => stats.completed += 1,
                }
                stats
            },
        )
    }
}

/// Snapshot of the caller's tasks as last fetched.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    tasks: Vec<Task>,
}

impl Dashboard {
    /// Fetches every task the session's user owns.
    pub async fn load(client: &TaskflowClient, session: &Session) -> Result<Self, ClientError> {
        let tasks = client
            .list_tasks(session, &TaskListFilter::default())
            .await?;
        Ok(Self::from_tasks(tasks))
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn visible(&self, filter: &DashboardFilter) -> Vec<&Task> {
        filter.apply(&self.tasks)
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_tasks(&self.tasks)
    }
}
