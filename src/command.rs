//! Commands sent to services and the outcomes they resolve to.
//!
//! A view never mutates its local state before the service answers: it
//! issues a [`Command`], the [`Dispatcher`](crate::dispatcher::Dispatcher)
//! awaits the service, and only the resulting [`Outcome`] is applied.
//!
//! # Example
//!
//! ```
//! use taskdesk::command::Command;
//! use taskdesk::models::TaskPatch;
//! use taskdesk::models::TaskStatus;
//! use taskdesk::backend::InMemoryBackend;
//! use taskdesk::services::TaskService;
//!
//! let cmd: Command<TaskService<InMemoryBackend>> =
//!     Command::Update("task-1".to_string(), TaskPatch::status(TaskStatus::Review));
//! assert_eq!(cmd.to_string(), "Update(task-1)");
//! ```

use crate::services::CrudService;
use std::fmt;

/// Request addressed to a [`CrudService`].
pub enum Command<S: CrudService> {
    /// Reload the whole collection.
    Refresh,
    /// Load one record.
    Fetch(String),
    Create(S::Draft),
    Update(String, S::Patch),
    Delete(String),
}

impl<S: CrudService> Command<S> {
    /// Id the command addresses, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Command::Refresh | Command::Create(_) => None,
            Command::Fetch(id) | Command::Update(id, _) | Command::Delete(id) => Some(id),
        }
    }

    /// True for commands that change stored records.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::Create(_) | Command::Update(..) | Command::Delete(_)
        )
    }
}

impl<S: CrudService> Clone for Command<S> {
    fn clone(&self) -> Self {
        match self {
            Command::Refresh => Command::Refresh,
            Command::Fetch(id) => Command::Fetch(id.clone()),
            Command::Create(draft) => Command::Create(draft.clone()),
            Command::Update(id, patch) => Command::Update(id.clone(), patch.clone()),
            Command::Delete(id) => Command::Delete(id.clone()),
        }
    }
}

impl<S: CrudService> fmt::Display for Command<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Refresh => write!(f, "Refresh"),
            Command::Fetch(id) => write!(f, "Fetch({})", id),
            Command::Create(_) => write!(f, "Create"),
            Command::Update(id, _) => write!(f, "Update({})", id),
            Command::Delete(id) => write!(f, "Delete({})", id),
        }
    }
}

impl<S: CrudService> fmt::Debug for Command<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// What a resolved command produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    Listed(Vec<T>),
    Fetched(T),
    Created(T),
    Updated(T),
    /// Id of the removed record.
    Deleted(String),
}

impl<T> Outcome<T> {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Listed(_) => "listed",
            Outcome::Fetched(_) => "fetched",
            Outcome::Created(_) => "created",
            Outcome::Updated(_) => "updated",
            Outcome::Deleted(_) => "deleted",
        }
    }
}

/// Run one command against a service.
///
/// # Errors
/// Propagates the service error unchanged
pub(crate) async fn run<S: CrudService>(
    service: &S,
    command: Command<S>,
) -> crate::Result<Outcome<S::Entity>> {
    Ok(match command {
        Command::Refresh => Outcome::Listed(service.get_all().await?),
        Command::Fetch(id) => Outcome::Fetched(service.get_by_id(&id).await?),
        Command::Create(draft) => Outcome::Created(service.create(draft).await?),
        Command::Update(id, patch) => Outcome::Updated(service.update(&id, patch).await?),
        Command::Delete(id) => {
            service.delete(&id).await?;
            Outcome::Deleted(id)
        }
    })
}
