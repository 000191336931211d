//! Store metrics and simulated latency.
//!
//! Two concerns live here:
//!
//! - **Metrics (`StoreMetrics`)**: hooks for reads, misses, writes, deletes
//!   and errors, with timings.
//! - **Latency (`LatencyPolicy`)**: an artificial delay before each store
//!   operation, so that a dashboard wired to the in-memory store behaves like
//!   one talking to a remote backend.
//!
//! # Metrics
//!
//! ```ignore
//! use taskdesk::observability::StoreMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl StoreMetrics for PrometheusMetrics {
//!     fn record_read(&self, _key: &str, _duration: Duration) {
//!         // counter!("store_reads").inc();
//!     }
//! }
//! ```
//!
//! The trait's default methods log through the `log` crate; [`NoOpMetrics`]
//! discards everything.
//!
//! # Latency
//!
//! ```
//! use taskdesk::observability::{LatencyPolicy, StoreOperation};
//! use std::time::Duration;
//!
//! let _none = LatencyPolicy::None;
//! let _flat = LatencyPolicy::Fixed(Duration::from_millis(50));
//! let policy = LatencyPolicy::PerOperation(taskdesk::observability::dashboard_latency);
//! assert_eq!(
//!     policy.delay_for(StoreOperation::Create),
//!     Some(Duration::from_millis(350))
//! );
//! ```

use std::time::Duration;

/// Kind of store operation, used to pick a simulated delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Single record lookup
    Read,
    /// Collection scan
    List,
    /// New record
    Create,
    /// Replace existing record
    Update,
    /// Remove record
    Delete,
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreOperation::Read => write!(f, "Read"),
            StoreOperation::List => write!(f, "List"),
            StoreOperation::Create => write!(f, "Create"),
            StoreOperation::Update => write!(f, "Update"),
            StoreOperation::Delete => write!(f, "Delete"),
        }
    }
}

/// Trait for store metrics collection.
pub trait StoreMetrics: Send + Sync {
    /// Record a successful single-record read.
    fn record_read(&self, key: &str, duration: Duration) {
        debug!("Store READ: {} took {:?}", key, duration);
    }

    /// Record a lookup that found nothing.
    fn record_miss(&self, key: &str, duration: Duration) {
        debug!("Store MISS: {} took {:?}", key, duration);
    }

    /// Record a create or update.
    fn record_write(&self, key: &str, duration: Duration) {
        debug!("Store WRITE: {} took {:?}", key, duration);
    }

    /// Record a delete.
    fn record_delete(&self, key: &str, duration: Duration) {
        debug!("Store DELETE: {} took {:?}", key, duration);
    }

    /// Record an error.
    fn record_error(&self, key: &str, error: &str) {
        warn!("Store ERROR for {}: {}", key, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl StoreMetrics for NoOpMetrics {
    fn record_read(&self, _key: &str, _duration: Duration) {}
    fn record_miss(&self, _key: &str, _duration: Duration) {}
    fn record_write(&self, _key: &str, _duration: Duration) {}
    fn record_delete(&self, _key: &str, _duration: Duration) {}
    fn record_error(&self, _key: &str, _error: &str) {}
}

/// Metrics implementation that only uses the trait's logging defaults.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl StoreMetrics for LogMetrics {}

/// Simulated latency applied before each store operation.
#[derive(Clone, Debug, Default)]
pub enum LatencyPolicy {
    /// No delay
    #[default]
    None,

    /// Same delay for every operation
    Fixed(Duration),

    /// Delay chosen per operation kind
    PerOperation(fn(StoreOperation) -> Duration),
}

impl LatencyPolicy {
    /// Delay for an operation, `None` when no delay applies.
    pub fn delay_for(&self, operation: StoreOperation) -> Option<Duration> {
        let delay = match self {
            LatencyPolicy::None => return None,
            LatencyPolicy::Fixed(d) => *d,
            LatencyPolicy::PerOperation(f) => f(operation),
        };
        (!delay.is_zero()).then_some(delay)
    }

    /// Sleep for the operation's delay, if any.
    pub async fn wait(&self, operation: StoreOperation) {
        if let Some(delay) = self.delay_for(operation) {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Delays matching the dashboard's mock API.
pub fn dashboard_latency(operation: StoreOperation) -> Duration {
    let millis = match operation {
        StoreOperation::Read => 200,
        StoreOperation::List => 250,
        StoreOperation::Create => 350,
        StoreOperation::Update => 300,
        StoreOperation::Delete => 250,
    };
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_metrics() {
        let metrics = NoOpMetrics;
        metrics.record_read("task:1", Duration::from_secs(1));
        metrics.record_miss("task:2", Duration::from_secs(2));
        metrics.record_error("task:3", "boom");
    }

    #[test]
    fn test_latency_none() {
        assert_eq!(LatencyPolicy::None.delay_for(StoreOperation::Read), None);
        assert_eq!(LatencyPolicy::default().delay_for(StoreOperation::List), None);
    }

    #[test]
    fn test_latency_fixed() {
        let policy = LatencyPolicy::Fixed(Duration::from_millis(40));
        assert_eq!(
            policy.delay_for(StoreOperation::Delete),
            Some(Duration::from_millis(40))
        );
        assert_eq!(
            LatencyPolicy::Fixed(Duration::ZERO).delay_for(StoreOperation::Delete),
            None
        );
    }

    #[test]
    fn test_latency_per_operation() {
        let policy = LatencyPolicy::PerOperation(dashboard_latency);
        assert_eq!(
            policy.delay_for(StoreOperation::Read),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            policy.delay_for(StoreOperation::Update),
            Some(Duration::from_millis(300))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_wait_advances_clock() {
        let policy = LatencyPolicy::Fixed(Duration::from_millis(250));
        let start = tokio::time::Instant::now();
        policy.wait(StoreOperation::List).await;
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
