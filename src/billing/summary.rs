//! Read-only reductions over the invoice collection.

use crate::models::{Invoice, InvoiceStatus};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

/// Dashboard money overview.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    /// Sum of `total` over paid invoices.
    pub total_revenue: Decimal,
    pub pending_amount: Decimal,
    pub overdue_amount: Decimal,
    pub partial_amount: Decimal,
    pub total_invoices: usize,
    pub paid_invoices: usize,
    pub pending_invoices: usize,
    pub overdue_invoices: usize,
}

impl FinancialSummary {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        let mut summary = FinancialSummary {
            total_invoices: invoices.len(),
            ..Default::default()
        };

        for invoice in invoices {
            match invoice.status {
                InvoiceStatus::Paid => {
                    summary.total_revenue += invoice.total;
                    summary.paid_invoices += 1;
                }
                InvoiceStatus::Pending => {
                    summary.pending_amount += invoice.amount_due;
                    summary.pending_invoices += 1;
                }
                InvoiceStatus::Overdue => {
                    summary.overdue_amount += invoice.amount_due;
                    summary.overdue_invoices += 1;
                }
                InvoiceStatus::Partial => summary.partial_amount += invoice.amount_due,
            }
        }
        summary
    }
}

/// Paid revenue per calendar month of `year`, keyed by issue date.
pub fn revenue_by_month(invoices: &[Invoice], year: i32) -> [Decimal; 12] {
    let mut months = [Decimal::ZERO; 12];
    invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Paid && invoice.issue_date.year() == year)
        .for_each(|invoice| months[invoice.issue_date.month0() as usize] += invoice.total);
    months
}
