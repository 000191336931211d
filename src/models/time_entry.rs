//! Time tracking records.

use super::merge;
use crate::entity::Entity;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A tracked interval of work on a task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub task_id: String,
    pub project_id: Option<String>,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Whole minutes.
    pub duration: u32,
}

impl TimeEntry {
    pub fn from_draft(id: String, draft: NewTimeEntry, now: DateTime<Utc>) -> Self {
        let start_time = draft.start_time.unwrap_or(now);
        let duration = match (draft.duration, draft.end_time) {
            (Some(minutes), _) => minutes,
            (None, Some(end)) => minutes_between(start_time, end),
            (None, None) => 0,
        };

        TimeEntry {
            id,
            task_id: draft.task_id,
            project_id: draft.project_id,
            description: draft.description,
            start_time,
            end_time: draft.end_time,
            duration,
        }
    }

    /// A timer is running until it has an end time.
    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Stop a running timer and derive its duration.
    ///
    /// # Errors
    /// Returns `Error::Validation` if already stopped or `at` precedes the start
    pub fn stop(&mut self, at: DateTime<Utc>) -> Result<()> {
        if !self.is_running() {
            return Err(Error::Validation(format!(
                "time entry {} is already stopped",
                self.id
            )));
        }
        if at < self.start_time {
            return Err(Error::Validation(
                "end time must not precede start time".to_string(),
            ));
        }
        self.end_time = Some(at);
        self.duration = minutes_between(self.start_time, at);
        Ok(())
    }

    pub fn apply(&mut self, patch: TimeEntryPatch) -> bool {
        let mut changed = merge(&mut self.description, patch.description);
        changed |= merge(&mut self.task_id, patch.task_id);
        changed |= merge(&mut self.project_id, patch.project_id.map(Some));
        changed |= merge(&mut self.start_time, patch.start_time);
        changed |= merge(&mut self.end_time, patch.end_time.map(Some));
        changed |= merge(&mut self.duration, patch.duration);
        changed
    }
}

fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    u32::try_from((end - start).num_minutes().max(0)).unwrap_or(u32::MAX)
}

impl Entity for TimeEntry {
    type Key = String;

    fn entity_key(&self) -> Self::Key {
        self.id.clone()
    }

    fn collection() -> &'static str {
        "time_entry"
    }

    fn entity_name() -> &'static str {
        "Time entry"
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeEntry {
    #[validate(length(min = 1, message = "task id is required"))]
    pub task_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Defaults to the creation instant.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Derived from start and end when absent.
    #[serde(default)]
    pub duration: Option<u32>,
}

impl NewTimeEntry {
    pub fn for_task(task_id: impl Into<String>) -> Self {
        NewTimeEntry {
            task_id: task_id.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryPatch {
    #[validate(length(min = 1, message = "task id must not be empty"))]
    pub task_id: Option<String>,
    pub project_id: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<u32>,
}
