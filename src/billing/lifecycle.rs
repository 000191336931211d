//! Payment application, status derivation and the overdue sweep.

use super::totals::InvoiceTotals;
use crate::error::{Error, Result};
use crate::models::{Invoice, InvoiceStatus, Payment};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Status after the paid/due balances change.
///
/// Fully settled invoices are paid, anything with money received is partial.
/// An unpaid invoice keeps pending or overdue, and falls back to pending if
/// it was only settled because its total had been zero.
pub fn derive_status(
    amount_paid: Decimal,
    amount_due: Decimal,
    current: InvoiceStatus,
) -> InvoiceStatus {
    if amount_due <= Decimal::ZERO {
        InvoiceStatus::Paid
    } else if amount_paid > Decimal::ZERO {
        InvoiceStatus::Partial
    } else {
        match current {
            InvoiceStatus::Paid | InvoiceStatus::Partial => InvoiceStatus::Pending,
            other => other,
        }
    }
}

/// Check a payment amount against an invoice before recording it.
///
/// # Errors
/// Returns `Error::Validation` for non-positive amounts or amounts above
/// what is still due
pub fn check_payment(invoice: &Invoice, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::Validation(format!(
            "payment amount must be positive, got {}",
            amount
        )));
    }
    if amount > invoice.amount_due {
        return Err(Error::Validation(format!(
            "payment of {} exceeds amount due {} on {}",
            amount, invoice.amount_due, invoice.number
        )));
    }
    Ok(())
}

impl Invoice {
    /// Record a payment and re-derive balances and status.
    ///
    /// Accepts any amount; [`check_payment`] is the gate for user input.
    pub fn apply_payment(&mut self, payment: Payment) {
        self.amount_paid += payment.amount;
        self.payments.push(payment);
        self.amount_due = self.total - self.amount_paid;
        self.status = derive_status(self.amount_paid, self.amount_due, self.status);
    }

    /// Recompute line amounts and totals after items or rates changed.
    ///
    /// The status is re-derived against the new total, see [`derive_status`].
    pub fn refresh_totals(&mut self) {
        for item in &mut self.items {
            item.recompute();
        }

        let totals = InvoiceTotals::compute(&self.items, self.tax_rate, self.discount_rate);
        self.subtotal = totals.subtotal;
        self.discount_amount = totals.discount_amount;
        self.tax_amount = totals.tax_amount;
        self.total = totals.total;
        self.amount_due = self.total - self.amount_paid;
        self.status = derive_status(self.amount_paid, self.amount_due, self.status);
    }

    /// Pending and past its due date on `today`.
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Pending && self.due_date < today
    }

    /// Flip a pending, past-due invoice to overdue. Returns whether it changed.
    pub fn mark_overdue_if_due(&mut self, today: NaiveDate) -> bool {
        if self.is_past_due(today) {
            self.status = InvoiceStatus::Overdue;
            true
        } else {
            false
        }
    }
}

/// Result of an overdue sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Invoices moved from pending to overdue by this sweep.
    pub newly_overdue: usize,
    /// Invoices overdue after the sweep.
    pub total_overdue: usize,
}

/// Run the overdue sweep over a batch of invoices in place.
///
/// Returns the report and the indices of the invoices that changed.
pub fn sweep_overdue(invoices: &mut [Invoice], today: NaiveDate) -> (SweepReport, Vec<usize>) {
    let changed: Vec<usize> = invoices
        .iter_mut()
        .enumerate()
        .filter_map(|(index, invoice)| invoice.mark_overdue_if_due(today).then_some(index))
        .collect();

    let report = SweepReport {
        newly_overdue: changed.len(),
        total_overdue: invoices
            .iter()
            .filter(|invoice| invoice.status == InvoiceStatus::Overdue)
            .count(),
    };
    (report, changed)
}
