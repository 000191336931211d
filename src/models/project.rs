//! Project records.

use super::merge;
use crate::entity::Entity;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Colour used for projects created without one.
pub const DEFAULT_PROJECT_COLOR: &str = "#6366f1";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub client_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn from_draft(id: String, draft: NewProject, now: DateTime<Utc>) -> Self {
        Project {
            id,
            name: draft.name,
            description: draft.description,
            color: draft
                .color
                .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string()),
            client_id: draft.client_id,
            due_date: draft.due_date,
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
        }
    }

    pub fn apply(&mut self, patch: ProjectPatch) -> bool {
        let mut changed = merge(&mut self.name, patch.name);
        changed |= merge(&mut self.description, patch.description);
        changed |= merge(&mut self.color, patch.color);
        changed |= merge(&mut self.client_id, patch.client_id.map(Some));
        changed |= merge(&mut self.due_date, patch.due_date.map(Some));
        changed |= merge(&mut self.is_active, patch.is_active);
        changed
    }
}

impl Entity for Project {
    type Key = String;

    fn entity_key(&self) -> Self::Key {
        self.id.clone()
    }

    fn collection() -> &'static str {
        "project"
    }

    fn entity_name() -> &'static str {
        "Project"
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Defaults to active.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl NewProject {
    pub fn named(name: impl Into<String>) -> Self {
        NewProject {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub client_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_defaults() {
        let project = Project::from_draft("p-1".into(), NewProject::named("Website"), Utc::now());
        assert!(project.is_active);
        assert_eq!(project.color, DEFAULT_PROJECT_COLOR);
    }

    #[test]
    fn test_explicitly_inactive() {
        let draft: NewProject =
            serde_json::from_str(r#"{ "name": "Archive", "isActive": false }"#).unwrap();
        let project = Project::from_draft("p-2".into(), draft, Utc::now());
        assert!(!project.is_active);
    }

    #[test]
    fn test_patch_deactivates() {
        let mut project = Project::from_draft("p-1".into(), NewProject::named("Website"), Utc::now());
        project.apply(ProjectPatch {
            is_active: Some(false),
            ..Default::default()
        });
        assert!(!project.is_active);
        assert_eq!(project.name, "Website");
    }
}
