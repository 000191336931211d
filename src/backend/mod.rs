//! Record store backends.

use crate::error::Result;

pub mod inmemory;

pub use inmemory::InMemoryBackend;

/// Trait for record store implementations.
///
/// Stores opaque, already-encoded records under `"{collection}:{id}"` keys and
/// owns the monotonic sequences used for document numbering. The in-memory
/// backend is the default; a database-backed implementation plugs in behind
/// the same trait.
///
/// **IMPORTANT:** All methods use `&self` so that one backend can be shared
/// by every service. Implementations use interior mutability.
///
/// **ASYNC:** All methods are async and must be awaited.
#[allow(async_fn_in_trait)]
pub trait StoreBackend: Send + Sync + Clone {
    /// Retrieve a record by key.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or replace a record.
    ///
    /// Replacing keeps the record's original position in scans.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove a record, returning whether it existed.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable
    async fn delete(&self, key: &str) -> Result<bool>;

    /// All records whose key starts with `prefix`, in insertion order.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<Vec<u8>>>;

    /// Increment and return the named sequence. The first value is 1.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable
    async fn next_sequence(&self, name: &str) -> Result<u64>;

    /// Raise the named sequence to at least `floor` without ever lowering it.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable
    async fn advance_sequence(&self, name: &str, floor: u64) -> Result<()>;

    /// Rewrite an existing record in place as one atomic step.
    ///
    /// `apply` receives the stored bytes and returns their replacement. No
    /// other writer touches the record while it runs, and an `Err` from it
    /// leaves the record as it was. Returns `false` if the key is absent.
    ///
    /// # Errors
    /// Returns the error produced by `apply`, or `Err` if the store is
    /// unavailable
    async fn update<F>(&self, key: &str, apply: F) -> Result<bool>
    where
        F: FnOnce(&[u8]) -> Result<Vec<u8>> + Send;

    /// Check if key exists (optional optimization).
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
