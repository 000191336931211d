//! Feed trait for consuming command outcomes.

use crate::command::Outcome;
use crate::entity::Entity;
use crate::error::{Error, Result};

/// Local view state that absorbs resolved command outcomes.
///
/// The dispatcher calls [`ViewFeed::feed`] only after the service call has
/// succeeded. A failed call reaches [`ViewFeed::on_error`] instead and the
/// view keeps what it had.
///
/// # Example
///
/// ```
/// use taskdesk::command::Outcome;
/// use taskdesk::feed::ViewFeed;
/// use taskdesk::models::Task;
///
/// #[derive(Default)]
/// struct TaskCount {
///     count: usize,
/// }
///
/// impl ViewFeed<Task> for TaskCount {
///     fn feed(&mut self, outcome: Outcome<Task>) {
///         match outcome {
///             Outcome::Listed(tasks) => self.count = tasks.len(),
///             Outcome::Created(_) => self.count += 1,
///             Outcome::Deleted(_) => self.count = self.count.saturating_sub(1),
///             Outcome::Fetched(_) | Outcome::Updated(_) => {}
///         }
///     }
/// }
/// ```
pub trait ViewFeed<T: Entity>: Send {
    /// Apply a resolved outcome to the view.
    fn feed(&mut self, outcome: Outcome<T>);

    /// Optional: check the view can accept a command before it is sent.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Optional: called when the command failed for good.
    fn on_error(&mut self, _error: &Error) {}
}

/// Feed that remembers only the most recent outcome.
pub struct LastOutcome<T: Entity> {
    pub outcome: Option<Outcome<T>>,
    pub error: Option<Error>,
}

impl<T: Entity> LastOutcome<T> {
    pub fn new() -> Self {
        LastOutcome {
            outcome: None,
            error: None,
        }
    }
}

impl<T: Entity> Default for LastOutcome<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> ViewFeed<T> for LastOutcome<T> {
    fn feed(&mut self, outcome: Outcome<T>) {
        self.outcome = Some(outcome);
        self.error = None;
    }

    fn on_error(&mut self, error: &Error) {
        self.error = Some(error.clone());
    }
}
