//! List filters behind the task, calendar and client views.

use crate::models::{Client, Task};
use chrono::NaiveDate;
use serde::Serialize;

/// Which projects a task list shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ProjectSelection {
    #[default]
    All,
    One(String),
    /// Sidebar multi-select.
    AnyOf(Vec<String>),
}

impl ProjectSelection {
    pub fn matches(&self, project_id: Option<&str>) -> bool {
        match self {
            ProjectSelection::All => true,
            ProjectSelection::One(id) => project_id == Some(id.as_str()),
            ProjectSelection::AnyOf(ids) => {
                project_id.is_some_and(|pid| ids.iter().any(|id| id == pid))
            }
        }
    }
}

/// Project selection AND a case-insensitive text search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub project: ProjectSelection,
    /// Matched against title and description; blank matches everything.
    pub search: String,
}

impl TaskFilter {
    pub fn new(project: ProjectSelection, search: impl Into<String>) -> Self {
        TaskFilter {
            project,
            search: search.into(),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.project.matches(task.project_id.as_deref()) {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || task.title.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle)
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

/// Open tasks whose due date has passed.
pub fn urgent_tasks(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| task.due_date < today && !task.status.is_complete())
        .collect()
}

/// Tasks due on `today`, complete or not.
pub fn due_today(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|task| task.due_date == today).collect()
}

/// Completion of a project's tasks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgress {
    pub project_id: String,
    pub completed: usize,
    pub total: usize,
    /// Rounded; 0 for a project without tasks.
    pub percent: u8,
}

pub fn project_progress(project_id: &str, tasks: &[Task]) -> ProjectProgress {
    let (total, completed) = tasks
        .iter()
        .filter(|task| task.project_id.as_deref() == Some(project_id))
        .fold((0, 0), |(total, done), task| {
            (total + 1, done + usize::from(task.status.is_complete()))
        });

    let percent = if total == 0 {
        0
    } else {
        ((completed * 200 + total) / (total * 2)) as u8
    };

    ProjectProgress {
        project_id: project_id.to_string(),
        completed,
        total,
        percent,
    }
}

/// Clients matching a query; a blank query returns them all.
pub fn search_clients<'a>(clients: &'a [Client], query: &str) -> Vec<&'a Client> {
    let query = query.trim();
    clients
        .iter()
        .filter(|client| query.is_empty() || client.matches_query(query))
        .collect()
}
