//! Invoice arithmetic and lifecycle.
//!
//! Everything here is synchronous and store-agnostic except numbering, which
//! draws from a [`StoreBackend`](crate::backend::StoreBackend) sequence.
//! [`InvoiceService`](crate::services::InvoiceService) wires these pieces to
//! the repository.

pub mod lifecycle;
pub mod numbering;
pub mod summary;
pub mod totals;

pub use lifecycle::{check_payment, derive_status, sweep_overdue, SweepReport};
pub use numbering::InvoiceNumber;
pub use summary::{revenue_by_month, FinancialSummary};
pub use totals::{round_for_display, InvoiceTotals};
