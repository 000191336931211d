//! Dispatcher - issues commands, awaits the service, feeds the outcome.

use crate::command::{run as run_command, Command};
use crate::error::Result;
use crate::feed::ViewFeed;
use crate::services::CrudService;
use std::time::{Duration, Instant};

/// Base delay of the retry backoff; attempt `n` waits `base * 2^(n-1)`.
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Longest wait between two attempts.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Backoff before retrying after failed attempt `attempt` (1-based).
pub fn retry_delay(attempt: u32) -> Duration {
    let factor = 2_u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    RETRY_BASE_DELAY.saturating_mul(factor).min(MAX_RETRY_DELAY)
}

/// Per-operation overrides.
///
/// # Example
///
/// ```
/// use taskdesk::OperationConfig;
///
/// // Retry transient store failures up to three times.
/// let config = OperationConfig::default().with_retry(3);
/// assert_eq!(config.retry_count, 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct OperationConfig {
    /// Number of retry attempts for this operation (0 = no retry).
    ///
    /// Only transient failures (see `Error::is_transient`) are retried, with
    /// exponential backoff. Not-found and validation errors fail at once.
    pub retry_count: u32,
}

impl OperationConfig {
    /// Set retry count for this operation.
    pub fn with_retry(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }
}

/// Applies service outcomes to views once the call has resolved.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    defaults: OperationConfig,
}

impl Dispatcher {
    /// Create a dispatcher without retries.
    pub fn new() -> Self {
        Dispatcher::default()
    }

    /// Use `config` for every [`Dispatcher::execute`] call.
    pub fn with_defaults(mut self, config: OperationConfig) -> Self {
        self.defaults = config;
        self
    }

    /// Run `command` against `service` and feed the outcome to `feed`.
    ///
    /// # Errors
    ///
    /// Returns the service error after notifying `feed.on_error`; the feed's
    /// state is left untouched.
    pub async fn execute<S, F>(&self, service: &S, command: Command<S>, feed: &mut F) -> Result<()>
    where
        S: CrudService,
        F: ViewFeed<S::Entity>,
    {
        self.execute_with_config(service, command, feed, self.defaults.clone())
            .await
    }

    /// Execute with custom configuration.
    ///
    /// Transient failures are retried up to `config.retry_count` times with
    /// exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the feed rejects the command up front, or with the
    /// last service error once retries are exhausted
    pub async fn execute_with_config<S, F>(
        &self,
        service: &S,
        command: Command<S>,
        feed: &mut F,
        config: OperationConfig,
    ) -> Result<()>
    where
        S: CrudService,
        F: ViewFeed<S::Entity>,
    {
        feed.validate()?;

        let timer = Instant::now();
        let max_attempts = config.retry_count.saturating_add(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!("» Dispatching {} (attempt {}/{})", command, attempts, max_attempts);

            match run_command(service, command.clone()).await {
                Ok(outcome) => {
                    debug!(
                        "✓ {} {} in {:?}",
                        command,
                        outcome.label(),
                        timer.elapsed()
                    );
                    feed.feed(outcome);
                    return Ok(());
                }
                Err(e) if e.is_transient() && attempts < max_attempts => {
                    debug!(
                        "{} failed (attempt {}/{}), retrying: {}",
                        command, attempts, max_attempts, e
                    );
                    tokio::time::sleep(retry_delay(attempts)).await;
                }
                Err(e) => {
                    warn!("✗ {} failed: {}", command, e);
                    feed.on_error(&e);
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Outcome;
    use crate::error::Error;
    use crate::feed::LastOutcome;
    use crate::models::{NewProject, Project, ProjectPatch};
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Service that fails with a store error a fixed number of times.
    struct Flaky {
        failures_left: AtomicU32,
        calls: AtomicU32,
        error: Error,
    }

    impl Flaky {
        fn new(failures: u32, error: Error) -> Self {
            Flaky {
                failures_left: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
                error,
            }
        }

        fn attempt(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(self.error.clone());
            }
            Ok(())
        }
    }

    impl CrudService for Flaky {
        type Entity = Project;
        type Draft = NewProject;
        type Patch = ProjectPatch;

        async fn get_all(&self) -> Result<Vec<Project>> {
            self.attempt()?;
            Ok(vec![Project::from_draft(
                "proj-1".into(),
                NewProject::named("Site"),
                Utc::now(),
            )])
        }

        async fn get_by_id(&self, id: &str) -> Result<Project> {
            self.attempt()?;
            Err(Error::not_found("Project", id))
        }

        async fn create(&self, draft: NewProject) -> Result<Project> {
            self.attempt()?;
            Ok(Project::from_draft("proj-2".into(), draft, Utc::now()))
        }

        async fn update(&self, id: &str, _patch: ProjectPatch) -> Result<Project> {
            Err(Error::not_found("Project", id))
        }

        async fn delete(&self, _id: &str) -> Result<()> {
            self.attempt()
        }
    }

    #[tokio::test]
    async fn test_feeds_outcome_on_success() {
        let service = Flaky::new(0, Error::Backend("down".into()));
        let mut feed = LastOutcome::new();

        Dispatcher::new()
            .execute(&service, Command::Delete("proj-1".into()), &mut feed)
            .await
            .unwrap();
        assert_eq!(feed.outcome, Some(Outcome::Deleted("proj-1".into())));
    }

    #[tokio::test]
    async fn test_failure_leaves_feed_state() {
        let service = Flaky::new(0, Error::Backend("down".into()));
        let mut feed = LastOutcome::new();
        feed.feed(Outcome::Deleted("earlier".into()));

        let err = Dispatcher::new()
            .execute(&service, Command::Fetch("proj-9".into()), &mut feed)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(feed.outcome, Some(Outcome::Deleted("earlier".into())));
        assert!(feed.error.as_ref().is_some_and(Error::is_not_found));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_errors() {
        let service = Flaky::new(2, Error::Backend("down".into()));
        let mut feed = LastOutcome::new();

        Dispatcher::new()
            .execute_with_config(
                &service,
                Command::Refresh,
                &mut feed,
                OperationConfig::default().with_retry(3),
            )
            .await
            .unwrap();

        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
        assert!(matches!(feed.outcome, Some(Outcome::Listed(ref p)) if p.len() == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_retry_budget() {
        let service = Flaky::new(5, Error::Backend("down".into()));
        let mut feed = LastOutcome::new();

        let result = Dispatcher::new()
            .with_defaults(OperationConfig::default().with_retry(1))
            .execute(&service, Command::Refresh, &mut feed)
            .await;

        assert!(matches!(result, Err(Error::Backend(_))));
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
        assert!(feed.outcome.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_retry_budget_backs_off_without_overflow() {
        let service = Flaky::new(34, Error::Backend("down".into()));
        let mut feed = LastOutcome::new();

        Dispatcher::new()
            .execute_with_config(
                &service,
                Command::Refresh,
                &mut feed,
                OperationConfig::default().with_retry(40),
            )
            .await
            .unwrap();

        assert_eq!(service.calls.load(Ordering::SeqCst), 35);
        assert!(feed.outcome.is_some());
    }

    #[tokio::test]
    async fn test_validation_errors_not_retried() {
        let service = Flaky::new(3, Error::Validation("bad".into()));
        let mut feed = LastOutcome::new();

        let result = Dispatcher::new()
            .execute_with_config(
                &service,
                Command::Create(NewProject::named("Site")),
                &mut feed,
                OperationConfig::default().with_retry(3),
            )
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retry_delay_is_capped() {
        assert_eq!(retry_delay(1), Duration::from_millis(100));
        assert_eq!(retry_delay(4), Duration::from_millis(800));
        assert_eq!(retry_delay(9), Duration::from_millis(25_600));
        assert_eq!(retry_delay(10), MAX_RETRY_DELAY);
        assert_eq!(retry_delay(33), MAX_RETRY_DELAY);
        assert_eq!(retry_delay(u32::MAX), MAX_RETRY_DELAY);
    }
}
