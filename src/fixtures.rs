//! Bundled demo records.
//!
//! The JSON documents under `fixtures/` are compiled into the crate and can
//! be loaded into a [`Workspace`](crate::Workspace) with
//! [`Workspace::seed_fixtures`](crate::Workspace::seed_fixtures).

use crate::error::Result;
use crate::models::{Client, Invoice, Project, Task, TimeEntry};
use serde::de::DeserializeOwned;
use serde::Serialize;

const TASKS: &str = include_str!("../fixtures/tasks.json");
const PROJECTS: &str = include_str!("../fixtures/projects.json");
const CLIENTS: &str = include_str!("../fixtures/clients.json");
const TIME_ENTRIES: &str = include_str!("../fixtures/time_entries.json");
const INVOICES: &str = include_str!("../fixtures/invoices.json");

/// One full set of demo records.
#[derive(Clone, Debug)]
pub struct Fixtures {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub clients: Vec<Client>,
    pub time_entries: Vec<TimeEntry>,
    pub invoices: Vec<Invoice>,
}

impl Fixtures {
    /// Parse the documents shipped with the crate.
    ///
    /// # Errors
    /// Returns `Error::Deserialization` if a document does not match its model
    pub fn bundled() -> Result<Self> {
        Ok(Fixtures {
            tasks: parse("tasks", TASKS)?,
            projects: parse("projects", PROJECTS)?,
            clients: parse("clients", CLIENTS)?,
            time_entries: parse("time_entries", TIME_ENTRIES)?,
            invoices: parse("invoices", INVOICES)?,
        })
    }

    pub fn counts(&self) -> FixtureReport {
        FixtureReport {
            tasks: self.tasks.len(),
            projects: self.projects.len(),
            clients: self.clients.len(),
            time_entries: self.time_entries.len(),
            invoices: self.invoices.len(),
        }
    }
}

/// Number of records loaded per collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureReport {
    pub tasks: usize,
    pub projects: usize,
    pub clients: usize,
    pub time_entries: usize,
    pub invoices: usize,
}

impl FixtureReport {
    pub fn total(&self) -> usize {
        self.tasks + self.projects + self.clients + self.time_entries + self.invoices
    }
}

fn parse<T: DeserializeOwned>(name: &str, document: &str) -> Result<Vec<T>> {
    serde_json::from_str(document).map_err(|e| {
        error!("Fixture {} is malformed: {}", name, e);
        e.into()
    })
}
