//! Task service.

use super::{check, import_records, today, trim_in_place, CrudService};
use crate::backend::StoreBackend;
use crate::error::Result;
use crate::models::{new_id, NewTask, Task, TaskPatch, TaskStatus};
use crate::repository::{Repository, StoreRepository};
use chrono::Utc;

#[derive(Clone)]
pub struct TaskService<B: StoreBackend> {
    repo: StoreRepository<Task, B>,
}

impl<B: StoreBackend> TaskService<B> {
    pub fn new(repo: StoreRepository<Task, B>) -> Self {
        TaskService { repo }
    }

    /// Tasks attached to a project.
    ///
    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn get_by_project(&self, project_id: &str) -> Result<Vec<Task>> {
        let tasks = self.repo.fetch_all().await?;
        Ok(tasks
            .into_iter()
            .filter(|task| task.project_id.as_deref() == Some(project_id))
            .collect())
    }

    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn get_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        let tasks = self.repo.fetch_all().await?;
        Ok(tasks.into_iter().filter(|task| task.status == status).collect())
    }

    /// Move a task to another status, e.g. after a kanban drop.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for an unknown id
    pub async fn set_status(&self, id: &str, status: TaskStatus) -> Result<Task> {
        self.update(id, TaskPatch::status(status)).await
    }

    /// Store complete task records as they are.
    ///
    /// # Errors
    /// Returns `Error::Validation` on a duplicate id
    pub async fn import(&self, tasks: Vec<Task>) -> Result<usize> {
        import_records(&self.repo, tasks).await
    }
}

impl<B: StoreBackend> CrudService for TaskService<B> {
    type Entity = Task;
    type Draft = NewTask;
    type Patch = TaskPatch;

    async fn get_all(&self) -> Result<Vec<Task>> {
        self.repo.fetch_all().await
    }

    async fn get_by_id(&self, id: &str) -> Result<Task> {
        self.repo.require(&id.to_string()).await
    }

    async fn create(&self, mut draft: NewTask) -> Result<Task> {
        trim_in_place(&mut draft.title);
        check("task", &draft)?;

        let task = Task::from_draft(new_id("task"), draft, today(), Utc::now());
        self.repo.insert(&task).await?;
        info!("Created task {} \"{}\"", task.id, task.title);
        Ok(task)
    }

    async fn update(&self, id: &str, mut patch: TaskPatch) -> Result<Task> {
        if let Some(title) = patch.title.as_mut() {
            trim_in_place(title);
        }
        check("task", &patch)?;

        let (task, changed) = self
            .repo
            .modify(&id.to_string(), |task| {
                let changed = task.apply(patch);
                Ok((task.clone(), changed))
            })
            .await?;
        if changed {
            info!("Updated task {} (status: {})", task.id, task.status);
        }
        Ok(task)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.repo.remove(&id.to_string()).await?;
        info!("Deleted task {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::error::Error;
    use crate::models::Priority;

    fn service() -> TaskService<InMemoryBackend> {
        TaskService::new(StoreRepository::new(InMemoryBackend::new()))
    }

    fn draft(title: &str, project: Option<&str>) -> NewTask {
        NewTask {
            title: title.to_string(),
            project_id: project.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let service = service();
        let task = service.create(draft("  Write brief  ", None)).await.unwrap();

        assert!(task.id.starts_with("task-"));
        assert_eq!(task.title, "Write brief");
        assert_eq!(task.time_spent, 0);
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(service.get_by_id(&task.id).await.unwrap(), task);
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let err = service().create(draft("   ", None)).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let service = service();
        assert_eq!(
            service.get_by_id("nope").await.unwrap_err().to_string(),
            "Task not found"
        );
        assert!(service
            .update("nope", TaskPatch::default())
            .await
            .unwrap_err()
            .is_not_found());
        assert!(service.delete("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let service = service();
        let task = service.create(draft("Draft", Some("p-1"))).await.unwrap();

        let updated = service
            .update(
                &task.id,
                TaskPatch {
                    priority: Some(Priority::High),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.title, "Draft");
        assert_eq!(updated.project_id.as_deref(), Some("p-1"));
    }

    #[tokio::test]
    async fn test_queries() {
        let service = service();
        let a = service.create(draft("A", Some("p-1"))).await.unwrap();
        service.create(draft("B", Some("p-2"))).await.unwrap();
        let c = service.create(draft("C", Some("p-1"))).await.unwrap();
        service.set_status(&c.id, TaskStatus::Complete).await.unwrap();

        let in_project: Vec<String> = service
            .get_by_project("p-1")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(in_project, vec![a.id, c.id.clone()]);

        let done = service.get_by_status(TaskStatus::Complete).await.unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, c.id);
    }

    #[tokio::test]
    async fn test_delete_preserves_order_of_rest() {
        let service = service();
        let a = service.create(draft("A", None)).await.unwrap();
        let b = service.create(draft("B", None)).await.unwrap();
        let c = service.create(draft("C", None)).await.unwrap();

        service.delete(&b.id).await.unwrap();
        let ids: Vec<String> = service.get_all().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_edits_both_land() {
        use crate::observability::LatencyPolicy;
        use std::time::Duration;

        let service = TaskService::new(
            StoreRepository::new(InMemoryBackend::new())
                .with_latency(LatencyPolicy::Fixed(Duration::from_millis(50))),
        );
        let task = service.create(draft("Draft", None)).await.unwrap();

        let (moved, renamed) = tokio::join!(
            service.set_status(&task.id, TaskStatus::Review),
            service.update(
                &task.id,
                TaskPatch {
                    title: Some("Final".to_string()),
                    ..Default::default()
                }
            )
        );
        moved.unwrap();
        renamed.unwrap();

        let stored = service.get_by_id(&task.id).await.unwrap();
        assert_eq!(stored.status, TaskStatus::Review);
        assert_eq!(stored.title, "Final");
    }
}
