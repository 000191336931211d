//! Records managed by the dashboard.
//!
//! Each record type comes with a draft (`New*`, validated on create) and a
//! patch (`*Patch`, fields set to `Some` overwrite the stored value).

pub mod client;
pub mod invoice;
pub mod project;
pub mod task;
pub mod time_entry;

pub use client::{BillingInfo, BillingPatch, Client, ClientPatch, NewClient};
pub use invoice::{
    Invoice, InvoicePatch, InvoiceStatus, LineItem, NewInvoice, NewLineItem, NewPayment, Payment,
    PaymentMethod, MAX_INVOICE_TOTAL, MAX_LINE_ITEMS, MAX_QUANTITY, MAX_RATE,
};
pub use project::{NewProject, Project, ProjectPatch};
pub use task::{NewTask, Priority, Task, TaskPatch, TaskStatus};
pub use time_entry::{NewTimeEntry, TimeEntry, TimeEntryPatch};

use uuid::Uuid;

/// Generate a new record id, e.g. `"inv-0192f0c4-..."`.
///
/// UUIDv7 ids sort by creation time.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7())
}

/// Replace `target` when the patch carries a value.
pub(crate) fn merge<T>(target: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *target = v;
            true
        }
        None => false,
    }
}
