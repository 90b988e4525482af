use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Represents the status of a task.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is yet to be done.
    Todo,
    /// Task is completed.
    Done,
}

impl TaskStatus {
    /// The status the toggle control switches to.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Todo => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Todo,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a task as held by the store and exchanged with the backend.
///
/// The backend sends Mongo-style `_id` fields, sometimes next to an `id`
/// virtual; either or both are accepted, `_id` winning.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    /// Stable identifier. Never derived from the title.
    pub id: String,
    /// The title of the task.
    pub title: String,
    /// The current status of the task.
    pub status: TaskStatus,
}

/// Wire shape of a task as stored locally or sent by the backend.
#[derive(Deserialize)]
struct TaskRecord {
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default = "default_status")]
    status: TaskStatus,
}

impl TryFrom<TaskRecord> for Task {
    type Error = String;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let id = record
            .mongo_id
            .or(record.id)
            .ok_or_else(|| "missing field `id`".to_string())?;
        Ok(Task {
            id,
            title: record.title,
            status: record.status,
        })
    }
}

fn default_status() -> TaskStatus {
    TaskStatus::Todo
}

impl Task {
    /// Creates a new `todo` task with a freshly generated UUID v4 id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            status: TaskStatus::Todo,
        }
    }
}

/// Partial update sent with `PATCH /api/tasks/:id`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            status: None,
        }
    }

    pub fn status(status: TaskStatus) -> Self {
        Self {
            title: None,
            status: Some(status),
        }
    }
}

/// Which tasks a query or the filter buttons select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Status(TaskStatus),
}

impl Filter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Status(status) => task.status == status,
        }
    }
}

impl FromStr for Filter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "todo" => Ok(Filter::Status(TaskStatus::Todo)),
            "done" => Ok(Filter::Status(TaskStatus::Done)),
            other => Err(AppError::Validation(format!(
                "Unknown filter '{}', expected all, todo or done",
                other
            ))),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Status(status) => status.fmt(f),
        }
    }
}
