//! Async services mirroring the dashboard API.
//!
//! Each service owns a [`StoreRepository`](crate::repository::StoreRepository)
//! for one record type and exposes `get_all`, `get_by_id`, `create`, `update`
//! and `delete` through [`CrudService`], plus the queries specific to that
//! record. Drafts and patches are validated here before anything is stored.

pub mod client_service;
pub mod invoice_service;
pub mod project_service;
pub mod task_service;
pub mod time_entry_service;

pub use client_service::ClientService;
pub use invoice_service::InvoiceService;
pub use project_service::ProjectService;
pub use task_service::TaskService;
pub use time_entry_service::TimeEntryService;

use crate::entity::Entity;
use crate::error::Result;
use crate::repository::Repository;
use chrono::{NaiveDate, Utc};
use validator::Validate;

/// The five operations every entity service supports.
///
/// Lookups by id fail with `Error::NotFound` (`"<Entity> not found"`).
#[allow(async_fn_in_trait)]
pub trait CrudService: Send + Sync {
    /// Record type served.
    type Entity: Entity<Key = String>;
    /// Fields accepted by `create`.
    type Draft: Clone + Send + Sync;
    /// Fields accepted by `update`; unset fields are left alone.
    type Patch: Clone + Send + Sync;

    /// All records in creation order.
    ///
    /// # Errors
    /// Returns `Err` if the store fails
    async fn get_all(&self) -> Result<Vec<Self::Entity>>;

    /// # Errors
    /// Returns `Error::NotFound` for an unknown id
    async fn get_by_id(&self, id: &str) -> Result<Self::Entity>;

    /// # Errors
    /// Returns `Error::Validation` when the draft is rejected
    async fn create(&self, draft: Self::Draft) -> Result<Self::Entity>;

    /// # Errors
    /// Returns `Error::NotFound` for an unknown id, `Error::Validation` for a
    /// rejected patch
    async fn update(&self, id: &str, patch: Self::Patch) -> Result<Self::Entity>;

    /// # Errors
    /// Returns `Error::NotFound` for an unknown id
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Current calendar day (UTC).
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Run derive-based validation, logging rejected input.
pub(crate) fn check<V: Validate>(entity: &str, input: &V) -> Result<()> {
    input.validate().map_err(|e| {
        warn!("Rejected {} input: {}", entity, e);
        e.into()
    })
}

/// Trim a required text field in place.
pub(crate) fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Insert already-complete records, e.g. from fixtures.
pub(crate) async fn import_records<T, R>(repo: &R, records: Vec<T>) -> Result<usize>
where
    T: Entity,
    R: Repository<T>,
{
    let count = records.len();
    for record in &records {
        Entity::validate(record)?;
        repo.insert(record).await?;
    }
    debug!("Imported {} {} record(s)", count, T::collection());
    Ok(count)
}
