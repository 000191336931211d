//! Workspace - the composition root the dashboard holds on to.

use crate::backend::{InMemoryBackend, StoreBackend};
use crate::billing::FinancialSummary;
use crate::command::Command;
use crate::config::Config;
use crate::dispatcher::{Dispatcher, OperationConfig};
use crate::error::Result;
use crate::feed::ViewFeed;
use crate::fixtures::{FixtureReport, Fixtures};
use crate::models::{Client, Invoice, Project, Task};
use crate::observability::{NoOpMetrics, StoreMetrics};
use crate::repository::StoreRepository;
use crate::services::{
    today, ClientService, CrudService, InvoiceService, ProjectService, TaskService,
    TimeEntryService,
};
use crate::views::urgent_tasks;
use chrono::NaiveDate;
use std::sync::Arc;

/// All services over one shared record store.
///
/// Wraps its services in `Arc` so a workspace can be cloned into every
/// handler or task that needs it. Every service writes through the same
/// backend; since backends use interior mutability no extra `Mutex` is
/// needed.
///
/// # Example
///
/// ```no_run
/// use taskdesk::{Config, Workspace};
/// use taskdesk::models::NewTask;
/// use taskdesk::services::CrudService;
///
/// #[tokio::main]
/// async fn main() -> taskdesk::Result<()> {
///     let workspace = Workspace::open(Config::default()).await?;
///
///     let task = workspace.tasks().create(NewTask::titled("Send proposal")).await?;
///     let handle = workspace.clone(); // cheap, shares the store
///     assert_eq!(handle.tasks().get_by_id(&task.id).await?.title, "Send proposal");
///     Ok(())
/// }
/// ```
pub struct Workspace<B: StoreBackend = InMemoryBackend> {
    inner: Arc<Inner<B>>,
}

struct Inner<B: StoreBackend> {
    backend: B,
    config: Arc<Config>,
    tasks: TaskService<B>,
    projects: ProjectService<B>,
    clients: ClientService<B>,
    time_entries: TimeEntryService<B>,
    invoices: InvoiceService<B>,
    dispatcher: Dispatcher,
}

impl<B: StoreBackend> Clone for Workspace<B> {
    fn clone(&self) -> Self {
        Workspace {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Workspace<InMemoryBackend> {
    /// Empty in-memory workspace with default configuration.
    pub fn in_memory() -> Self {
        Workspace::new(InMemoryBackend::new(), Config::default())
    }

    /// Build an in-memory workspace from `config`, loading the bundled
    /// fixtures when `seed_fixtures` is set.
    ///
    /// # Errors
    /// Returns `Error::Config` for an invalid configuration, or the import
    /// error if the fixtures cannot be loaded
    pub async fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let seed = config.seed_fixtures;
        let workspace = Workspace::new(InMemoryBackend::new(), config);
        if seed {
            workspace.seed_fixtures().await?;
        }
        Ok(workspace)
    }
}

impl<B: StoreBackend> Workspace<B> {
    /// Create a workspace over `backend` without metrics.
    pub fn new(backend: B, config: Config) -> Self {
        Self::with_metrics(backend, config, Arc::new(NoOpMetrics))
    }

    /// Create a workspace whose repositories report to `metrics`.
    pub fn with_metrics(backend: B, config: Config, metrics: Arc<dyn StoreMetrics>) -> Self {
        let latency = config.latency_policy();
        let config = Arc::new(config);

        macro_rules! repo {
            () => {
                StoreRepository::new(backend.clone())
                    .with_metrics(Arc::clone(&metrics))
                    .with_latency(latency.clone())
            };
        }

        let inner = Inner {
            tasks: TaskService::new(repo!()),
            projects: ProjectService::new(repo!()),
            clients: ClientService::new(repo!()),
            time_entries: TimeEntryService::new(repo!()),
            invoices: InvoiceService::new(repo!(), Arc::clone(&config)),
            dispatcher: Dispatcher::new(),
            config,
            backend,
        };
        Workspace {
            inner: Arc::new(inner),
        }
    }

    /// Retry transient store failures on every dispatched command.
    ///
    /// Only takes effect on a workspace that has not been cloned yet;
    /// returns it unchanged otherwise.
    pub fn with_retry(mut self, retry_count: u32) -> Self {
        match Arc::get_mut(&mut self.inner) {
            Some(inner) => {
                inner.dispatcher = Dispatcher::new()
                    .with_defaults(OperationConfig::default().with_retry(retry_count));
            }
            None => warn!("Workspace already shared, retry setting ignored"),
        }
        self
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub fn tasks(&self) -> &TaskService<B> {
        &self.inner.tasks
    }

    pub fn projects(&self) -> &ProjectService<B> {
        &self.inner.projects
    }

    pub fn clients(&self) -> &ClientService<B> {
        &self.inner.clients
    }

    pub fn time_entries(&self) -> &TimeEntryService<B> {
        &self.inner.time_entries
    }

    pub fn invoices(&self) -> &InvoiceService<B> {
        &self.inner.invoices
    }

    /// Run a command through the workspace dispatcher.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use taskdesk::command::Command;
    /// use taskdesk::models::Task;
    /// use taskdesk::views::ViewCache;
    /// use taskdesk::Workspace;
    ///
    /// # async fn demo() -> taskdesk::Result<()> {
    /// let workspace = Workspace::in_memory();
    /// let mut tasks: ViewCache<Task> = ViewCache::new();
    /// workspace.execute(workspace.tasks(), Command::Refresh, &mut tasks).await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the service error; `feed` is notified through `on_error` and
    /// keeps its state.
    pub async fn execute<S, F>(&self, service: &S, command: Command<S>, feed: &mut F) -> Result<()>
    where
        S: CrudService,
        F: ViewFeed<S::Entity>,
    {
        self.inner.dispatcher.execute(service, command, feed).await
    }

    /// Load the bundled demo records into this workspace.
    ///
    /// # Errors
    /// Returns `Error::Validation` if a fixture id already exists
    pub async fn seed_fixtures(&self) -> Result<FixtureReport> {
        let fixtures = Fixtures::bundled()?;
        let report = fixtures.counts();

        self.clients().import(fixtures.clients).await?;
        self.projects().import(fixtures.projects).await?;
        self.tasks().import(fixtures.tasks).await?;
        self.time_entries().import(fixtures.time_entries).await?;
        self.invoices().import(fixtures.invoices).await?;

        info!("Seeded workspace with {} fixture records", report.total());
        Ok(report)
    }

    /// Fetch everything the home and finance screens show at start-up.
    ///
    /// # Errors
    /// Returns the first store error of the concurrent loads
    pub async fn load_dashboard(&self) -> Result<DashboardSnapshot> {
        self.load_dashboard_as_of(today()).await
    }

    /// [`Workspace::load_dashboard`] against an explicit calendar day.
    ///
    /// # Errors
    /// Returns the first store error of the concurrent loads
    pub async fn load_dashboard_as_of(&self, today: NaiveDate) -> Result<DashboardSnapshot> {
        let (tasks, projects, clients, invoices) = futures::try_join!(
            self.tasks().get_all(),
            self.projects().get_all(),
            self.clients().get_all(),
            self.invoices().get_all(),
        )?;

        let urgent = urgent_tasks(&tasks, today)
            .into_iter()
            .map(|task| task.id.clone())
            .collect();
        let summary = FinancialSummary::from_invoices(&invoices);

        debug!(
            "Loaded dashboard: {} tasks, {} projects, {} clients, {} invoices",
            tasks.len(),
            projects.len(),
            clients.len(),
            invoices.len()
        );

        Ok(DashboardSnapshot {
            tasks,
            projects,
            clients,
            invoices,
            summary,
            urgent_task_ids: urgent,
        })
    }
}

/// Everything loaded for the first paint of the dashboard.
#[derive(Clone, Debug)]
pub struct DashboardSnapshot {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub clients: Vec<Client>,
    pub invoices: Vec<Invoice>,
    pub summary: FinancialSummary,
    /// Open tasks past their due date.
    pub urgent_task_ids: Vec<String>,
}
