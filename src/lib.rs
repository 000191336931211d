//! # taskdesk
//!
//! Records, services and view logic behind a task, project, client and
//! invoice dashboard.
//!
//! ## Features
//!
//! - **Typed records:** tasks, projects, clients, time entries and invoices
//!   with validated drafts and partial patches
//! - **Injected storage:** every service works against a [`StoreBackend`];
//!   the in-memory backend is the default
//! - **Invoice core:** exact decimal totals, payments, status derivation,
//!   the overdue sweep and the financial summary
//! - **View logic:** task filters, kanban grouping and a drop reducer, all
//!   free of any rendering concern
//! - **Command dispatch:** views change only after the service has answered
//!
//! ## Quick Start
//!
//! Use [`Workspace`] to get every service over one shared store:
//!
//! ```no_run
//! use taskdesk::{Command, Config, Workspace};
//! use taskdesk::models::{NewInvoice, NewLineItem, NewPayment, Task};
//! use taskdesk::services::CrudService;
//! use taskdesk::views::ViewCache;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> taskdesk::Result<()> {
//!     let workspace = Workspace::open(Config::default()).await?;
//!
//!     // 1. Bill a client
//!     let invoice = workspace
//!         .invoices()
//!         .create(NewInvoice {
//!             client_id: "client-1".into(),
//!             client_name: "Northwind".into(),
//!             client_email: "ap@northwind.test".into(),
//!             items: vec![NewLineItem::new("Design", Decimal::from(2), Decimal::from(100))],
//!             tax_rate: Decimal::from(10),
//!             discount_rate: Decimal::from(5),
//!             ..Default::default()
//!         })
//!         .await?;
//!     assert_eq!(invoice.total, Decimal::from(209));
//!
//!     // 2. Record a payment
//!     let invoice = workspace
//!         .invoices()
//!         .add_payment(&invoice.id, NewPayment::of(Decimal::from(9)))
//!         .await?;
//!     assert_eq!(invoice.amount_due, Decimal::from(200));
//!
//!     // 3. Keep a list view in sync
//!     let mut tasks: ViewCache<Task> = ViewCache::new();
//!     workspace.execute(workspace.tasks(), Command::Refresh, &mut tasks).await?;
//!     Ok(())
//! }
//! ```

#[macro_use]
extern crate log;

pub mod backend;
pub mod billing;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod entity;
pub mod error;
pub mod feed;
pub mod fixtures;
pub mod key;
pub mod models;
pub mod observability;
pub mod repository;
pub mod serialization;
pub mod services;
pub mod views;
pub mod workspace;

// Re-exports for convenience
pub use backend::{InMemoryBackend, StoreBackend};
pub use command::{Command, Outcome};
pub use config::Config;
pub use dispatcher::{Dispatcher, OperationConfig};
pub use entity::Entity;
pub use error::{Error, Result};
pub use feed::ViewFeed;
pub use repository::{Repository, StoreRepository};
pub use services::CrudService;
pub use workspace::{DashboardSnapshot, Workspace};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
