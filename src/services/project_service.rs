//! Project service.

use super::{check, import_records, trim_in_place, CrudService};
use crate::backend::StoreBackend;
use crate::error::Result;
use crate::models::{new_id, NewProject, Project, ProjectPatch};
use crate::repository::{Repository, StoreRepository};
use chrono::Utc;

#[derive(Clone)]
pub struct ProjectService<B: StoreBackend> {
    repo: StoreRepository<Project, B>,
}

impl<B: StoreBackend> ProjectService<B> {
    pub fn new(repo: StoreRepository<Project, B>) -> Self {
        ProjectService { repo }
    }

    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn get_active(&self) -> Result<Vec<Project>> {
        let projects = self.repo.fetch_all().await?;
        Ok(projects.into_iter().filter(|p| p.is_active).collect())
    }

    /// # Errors
    /// Returns `Error::Validation` on a duplicate id
    pub async fn import(&self, projects: Vec<Project>) -> Result<usize> {
        import_records(&self.repo, projects).await
    }
}

impl<B: StoreBackend> CrudService for ProjectService<B> {
    type Entity = Project;
    type Draft = NewProject;
    type Patch = ProjectPatch;

    async fn get_all(&self) -> Result<Vec<Project>> {
        self.repo.fetch_all().await
    }

    async fn get_by_id(&self, id: &str) -> Result<Project> {
        self.repo.require(&id.to_string()).await
    }

    async fn create(&self, mut draft: NewProject) -> Result<Project> {
        trim_in_place(&mut draft.name);
        check("project", &draft)?;

        let project = Project::from_draft(new_id("proj"), draft, Utc::now());
        self.repo.insert(&project).await?;
        info!("Created project {} \"{}\"", project.id, project.name);
        Ok(project)
    }

    async fn update(&self, id: &str, mut patch: ProjectPatch) -> Result<Project> {
        if let Some(name) = patch.name.as_mut() {
            trim_in_place(name);
        }
        check("project", &patch)?;

        let (project, changed) = self
            .repo
            .modify(&id.to_string(), |project| {
                let changed = project.apply(patch);
                Ok((project.clone(), changed))
            })
            .await?;
        if changed {
            info!("Updated project {}", project.id);
        }
        Ok(project)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.repo.remove(&id.to_string()).await?;
        info!("Deleted project {}", id);
        Ok(())
    }
}
