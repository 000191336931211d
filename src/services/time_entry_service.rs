//! Time entry service.

use super::{check, import_records, CrudService};
use crate::backend::StoreBackend;
use crate::error::Result;
use crate::models::{new_id, NewTimeEntry, TimeEntry, TimeEntryPatch};
use crate::repository::{Repository, StoreRepository};
use chrono::{DateTime, Utc};

#[derive(Clone)]
pub struct TimeEntryService<B: StoreBackend> {
    repo: StoreRepository<TimeEntry, B>,
}

impl<B: StoreBackend> TimeEntryService<B> {
    pub fn new(repo: StoreRepository<TimeEntry, B>) -> Self {
        TimeEntryService { repo }
    }

    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn get_by_task(&self, task_id: &str) -> Result<Vec<TimeEntry>> {
        let entries = self.repo.fetch_all().await?;
        Ok(entries.into_iter().filter(|e| e.task_id == task_id).collect())
    }

    /// Stop a running timer at `at`.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for an unknown id, `Error::Validation` if the
    /// entry is already stopped or `at` precedes its start
    pub async fn stop(&self, id: &str, at: DateTime<Utc>) -> Result<TimeEntry> {
        let entry = self
            .repo
            .modify(&id.to_string(), |entry| {
                entry
                    .stop(at)
                    .inspect_err(|e| warn!("Cannot stop time entry {}: {}", id, e))?;
                Ok(entry.clone())
            })
            .await?;
        info!("Stopped time entry {} after {} min", entry.id, entry.duration);
        Ok(entry)
    }

    /// Minutes logged against a task across all its entries.
    ///
    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn total_minutes_for_task(&self, task_id: &str) -> Result<u64> {
        let entries = self.get_by_task(task_id).await?;
        Ok(entries.iter().map(|e| u64::from(e.duration)).sum())
    }

    /// # Errors
    /// Returns `Error::Validation` on a duplicate id
    pub async fn import(&self, entries: Vec<TimeEntry>) -> Result<usize> {
        import_records(&self.repo, entries).await
    }
}

impl<B: StoreBackend> CrudService for TimeEntryService<B> {
    type Entity = TimeEntry;
    type Draft = NewTimeEntry;
    type Patch = TimeEntryPatch;

    async fn get_all(&self) -> Result<Vec<TimeEntry>> {
        self.repo.fetch_all().await
    }

    async fn get_by_id(&self, id: &str) -> Result<TimeEntry> {
        self.repo.require(&id.to_string()).await
    }

    async fn create(&self, draft: NewTimeEntry) -> Result<TimeEntry> {
        check("time entry", &draft)?;

        let entry = TimeEntry::from_draft(new_id("te"), draft, Utc::now());
        self.repo.insert(&entry).await?;
        info!("Created time entry {} for task {}", entry.id, entry.task_id);
        Ok(entry)
    }

    async fn update(&self, id: &str, patch: TimeEntryPatch) -> Result<TimeEntry> {
        check("time entry", &patch)?;

        let (entry, changed) = self
            .repo
            .modify(&id.to_string(), |entry| {
                let changed = entry.apply(patch);
                Ok((entry.clone(), changed))
            })
            .await?;
        if changed {
            info!("Updated time entry {}", entry.id);
        }
        Ok(entry)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.repo.remove(&id.to_string()).await?;
        info!("Deleted time entry {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use chrono::{Duration, TimeZone};

    fn service() -> TimeEntryService<InMemoryBackend> {
        TimeEntryService::new(StoreRepository::new(InMemoryBackend::new()))
    }

    fn entry(task: &str, minutes: Option<u32>) -> NewTimeEntry {
        NewTimeEntry {
            task_id: task.to_string(),
            duration: minutes,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_duration_defaults_to_zero() {
        let created = service().create(entry("task-1", None)).await.unwrap();
        assert_eq!(created.duration, 0);
        assert!(created.is_running());
    }

    #[tokio::test]
    async fn test_totals_per_task() {
        let service = service();
        service.create(entry("task-1", Some(30))).await.unwrap();
        service.create(entry("task-1", Some(45))).await.unwrap();
        service.create(entry("task-2", Some(10))).await.unwrap();

        assert_eq!(service.get_by_task("task-1").await.unwrap().len(), 2);
        assert_eq!(service.total_minutes_for_task("task-1").await.unwrap(), 75);
        assert_eq!(service.total_minutes_for_task("task-3").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stop() {
        let service = service();
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap();
        let created = service
            .create(NewTimeEntry {
                task_id: "task-1".to_string(),
                start_time: Some(start),
                ..Default::default()
            })
            .await
            .unwrap();

        let stopped = service
            .stop(&created.id, start + Duration::minutes(90))
            .await
            .unwrap();
        assert_eq!(stopped.duration, 90);
        assert_eq!(service.get_by_id(&created.id).await.unwrap(), stopped);

        assert!(service
            .stop(&created.id, start + Duration::minutes(95))
            .await
            .is_err());
        assert_eq!(
            service.stop("te-missing", start).await.unwrap_err().to_string(),
            "Time entry not found"
        );
    }
}
