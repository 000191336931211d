//! Repository trait for typed record access.
//!
//! Services never touch a global collection: they receive a repository built
//! over an injected [`StoreBackend`]. The default [`StoreRepository`] encodes
//! records with [`Entity::encode`] and keeps them in any backend, which makes
//! an in-memory store the natural fixture for tests and a database-backed
//! store a drop-in for production.
//!
//! ```ignore
//! use taskdesk::backend::InMemoryBackend;
//! use taskdesk::repository::{Repository, StoreRepository};
//!
//! let repo: StoreRepository<Task, _> = StoreRepository::new(InMemoryBackend::new());
//! repo.insert(&task).await?;
//! let loaded = repo.require(&task.id).await?;
//! ```

use crate::backend::StoreBackend;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::key::RecordKey;
use crate::observability::{LatencyPolicy, NoOpMetrics, StoreMetrics, StoreOperation};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

/// Trait for typed record repositories.
///
/// # Returns
/// Lookups return `Ok(None)` for a missing id; `require`, `modify` and
/// `remove` turn a missing id into `Error::NotFound`.
#[allow(async_fn_in_trait)]
pub trait Repository<T: Entity>: Send + Sync {
    /// Fetch a record by id.
    ///
    /// # Errors
    /// Returns `Err` if the store fails or the record cannot be decoded
    async fn fetch_by_id(&self, id: &T::Key) -> Result<Option<T>>;

    /// Every record of the collection, in creation order.
    ///
    /// # Errors
    /// Returns `Err` if the store fails or a record cannot be decoded
    async fn fetch_all(&self) -> Result<Vec<T>>;

    /// Store a new record.
    ///
    /// # Errors
    /// Returns `Error::Validation` if a record with the same id exists
    async fn insert(&self, entity: &T) -> Result<()>;

    /// Delete a record.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the record does not exist
    async fn remove(&self, id: &T::Key) -> Result<()>;

    /// Load, change and store one record without any other write in between.
    ///
    /// `change` sees the current record. Whatever it returns is passed back,
    /// and when it fails nothing is written.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the record does not exist, or the error
    /// returned by `change`
    async fn modify<R, F>(&self, id: &T::Key, change: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(&mut T) -> Result<R> + Send;

    /// Fetch a record, failing with `"<Entity> not found"` when absent.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the record does not exist
    async fn require(&self, id: &T::Key) -> Result<T> {
        self.fetch_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(T::entity_name(), id.to_string()))
    }

    /// Count records.
    ///
    /// # Errors
    /// Returns `Err` if the scan fails
    async fn count(&self) -> Result<u64> {
        Ok(self.fetch_all().await?.len() as u64)
    }
}

/// Repository storing encoded records in a [`StoreBackend`].
pub struct StoreRepository<T: Entity, B: StoreBackend> {
    backend: B,
    metrics: Arc<dyn StoreMetrics>,
    latency: LatencyPolicy,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, B: StoreBackend> Clone for StoreRepository<T, B> {
    fn clone(&self) -> Self {
        StoreRepository {
            backend: self.backend.clone(),
            metrics: Arc::clone(&self.metrics),
            latency: self.latency.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity, B: StoreBackend> StoreRepository<T, B> {
    /// Create a repository over a backend, without metrics or latency.
    pub fn new(backend: B) -> Self {
        StoreRepository {
            backend,
            metrics: Arc::new(NoOpMetrics),
            latency: LatencyPolicy::None,
            _entity: PhantomData,
        }
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Arc<dyn StoreMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set simulated latency.
    pub fn with_latency(mut self, latency: LatencyPolicy) -> Self {
        self.latency = latency;
        self
    }

    /// Get backend reference (for sequences and advanced use).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn decode_checked(&self, key: &str, bytes: &[u8]) -> Result<T> {
        let entity = T::decode(bytes).inspect_err(|e| {
            self.metrics.record_error(key, &e.to_string());
        })?;
        entity.validate()?;
        Ok(entity)
    }
}

impl<T: Entity, B: StoreBackend> Repository<T> for StoreRepository<T, B> {
    async fn fetch_by_id(&self, id: &T::Key) -> Result<Option<T>> {
        self.latency.wait(StoreOperation::Read).await;
        let timer = Instant::now();
        let key = RecordKey::build::<T>(id);

        match self.backend.get(&key).await? {
            Some(bytes) => {
                let entity = self.decode_checked(&key, &bytes)?;
                self.metrics.record_read(&key, timer.elapsed());
                Ok(Some(entity))
            }
            None => {
                self.metrics.record_miss(&key, timer.elapsed());
                Ok(None)
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<T>> {
        self.latency.wait(StoreOperation::List).await;
        let prefix = RecordKey::collection_prefix::<T>();

        self.backend
            .scan_prefix(&prefix)
            .await?
            .iter()
            .map(|bytes| self.decode_checked(&prefix, bytes))
            .collect()
    }

    async fn insert(&self, entity: &T) -> Result<()> {
        self.latency.wait(StoreOperation::Create).await;
        let timer = Instant::now();
        let key = RecordKey::build::<T>(&entity.entity_key());

        if self.backend.exists(&key).await? {
            self.metrics.record_error(&key, "duplicate id");
            return Err(Error::Validation(format!(
                "{} {} already exists",
                T::entity_name(),
                entity.entity_key()
            )));
        }

        self.backend.put(&key, entity.encode()?).await?;
        self.metrics.record_write(&key, timer.elapsed());
        Ok(())
    }

    async fn modify<R, F>(&self, id: &T::Key, change: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(&mut T) -> Result<R> + Send,
    {
        // One wait up front; the change itself runs under the record lock.
        self.latency.wait(StoreOperation::Update).await;
        let timer = Instant::now();
        let key = RecordKey::build::<T>(id);

        let mut outcome = None;
        let found = self
            .backend
            .update(&key, |bytes| {
                let mut entity = self.decode_checked(&key, bytes)?;
                outcome = Some(change(&mut entity)?);
                entity.encode()
            })
            .await?;

        match (found, outcome) {
            (true, Some(value)) => {
                self.metrics.record_write(&key, timer.elapsed());
                Ok(value)
            }
            _ => {
                self.metrics.record_miss(&key, timer.elapsed());
                Err(Error::not_found(T::entity_name(), id.to_string()))
            }
        }
    }

    async fn remove(&self, id: &T::Key) -> Result<()> {
        self.latency.wait(StoreOperation::Delete).await;
        let timer = Instant::now();
        let key = RecordKey::build::<T>(id);

        if self.backend.delete(&key).await? {
            self.metrics.record_delete(&key, timer.elapsed());
            Ok(())
        } else {
            self.metrics.record_miss(&key, timer.elapsed());
            Err(Error::not_found(T::entity_name(), id.to_string()))
        }
    }

    async fn count(&self) -> Result<u64> {
        let prefix = RecordKey::collection_prefix::<T>();
        Ok(self.backend.scan_prefix(&prefix).await?.len() as u64)
    }
}
