//! Task records.

use super::merge;
use crate::entity::Entity;
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Workflow status of a task.
///
/// The kanban board calls the last column `done`; it is the same state as
/// `complete` and deserializes to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    #[serde(alias = "done")]
    Complete,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Complete => "complete",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Complete)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "review" => Ok(TaskStatus::Review),
            "complete" | "done" => Ok(TaskStatus::Complete),
            other => Err(Error::Validation(format!("unknown task status: {}", other))),
        }
    }
}

/// Task priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// A unit of work, optionally attached to a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub project_id: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: NaiveDate,
    /// Minutes tracked against the task.
    pub time_spent: u32,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a task from a validated draft.
    pub fn from_draft(id: String, draft: NewTask, today: NaiveDate, now: DateTime<Utc>) -> Self {
        Task {
            id,
            title: draft.title,
            description: draft.description,
            project_id: draft.project_id,
            status: draft.status,
            priority: draft.priority,
            due_date: draft.due_date.unwrap_or(today),
            time_spent: draft.time_spent,
            created_at: now,
        }
    }

    /// Apply a patch, returning whether anything changed.
    pub fn apply(&mut self, patch: TaskPatch) -> bool {
        let mut changed = merge(&mut self.title, patch.title);
        changed |= merge(&mut self.description, patch.description);
        changed |= merge(&mut self.project_id, patch.project_id.map(Some));
        changed |= merge(&mut self.status, patch.status);
        changed |= merge(&mut self.priority, patch.priority);
        changed |= merge(&mut self.due_date, patch.due_date);
        changed |= merge(&mut self.time_spent, patch.time_spent);
        changed
    }
}

impl Entity for Task {
    type Key = String;

    fn entity_key(&self) -> Self::Key {
        self.id.clone()
    }

    fn collection() -> &'static str {
        "task"
    }

    fn entity_name() -> &'static str {
        "Task"
    }
}

/// Fields for a new task.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Defaults to the creation day.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub time_spent: u32,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial task update.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub time_spent: Option<u32>,
}

impl TaskPatch {
    /// Patch that only moves the task to another status.
    pub fn status(status: TaskStatus) -> Self {
        TaskPatch {
            status: Some(status),
            ..Default::default()
        }
    }
}
