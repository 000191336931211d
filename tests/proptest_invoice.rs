//! Property-based tests for the invoice core.
//!
//! # Properties Tested
//!
//! 1. **Subtotal**: subtotal is the sum of quantity * rate over all items
//! 2. **Totals**: discount is taken from the subtotal, tax from what remains
//! 3. **Balance**: after any accepted payments, due == total - paid
//! 4. **Status**: paid iff nothing is due, partial iff something was paid
//!    and something is still due
//! 5. **Sweep**: a second overdue sweep on the same day changes nothing

use chrono::{Days, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use taskdesk::billing::{check_payment, sweep_overdue, InvoiceTotals};
use taskdesk::models::{
    Invoice, InvoiceStatus, LineItem, NewInvoice, NewLineItem, NewPayment, Payment,
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Strategies
// ============================================================================

/// Quantity with up to two decimals, rate in cents.
fn arb_item() -> impl Strategy<Value = NewLineItem> {
    (1i64..=10_000, 0u32..=2, 0i64..=5_000_000).prop_map(|(qty, qty_scale, cents)| {
        NewLineItem::new("Work", Decimal::new(qty, qty_scale), Decimal::new(cents, 2))
    })
}

/// Whole percent with up to one decimal, 0 to 100.
fn arb_percent() -> impl Strategy<Value = Decimal> {
    (0i64..=1_000).prop_map(|tenths| Decimal::new(tenths, 1))
}

fn arb_invoice() -> impl Strategy<Value = Invoice> {
    (
        prop::collection::vec(arb_item(), 1..12),
        arb_percent(),
        arb_percent(),
        0u64..90,
    )
        .prop_map(|(items, tax_rate, discount_rate, terms)| {
            let issue = day(2026, 9, 1);
            let draft = NewInvoice {
                client_id: "client-1".into(),
                client_name: "Northwind".into(),
                client_email: "ap@northwind.test".into(),
                issue_date: Some(issue),
                due_date: Some(issue + Days::new(terms)),
                items,
                tax_rate,
                discount_rate,
                ..Default::default()
            };
            Invoice::from_draft(
                "inv-1".into(),
                "INV-2026-001".into(),
                draft,
                issue,
                30,
                Utc::now(),
            )
        })
}

/// Payment attempts in cents; some will be rejected as overpayments.
fn arb_payments() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-1_000i64..=20_000_000, 0..8)
}

fn pay(invoice: &mut Invoice, cents: i64) -> bool {
    let amount = Decimal::new(cents, 2);
    if check_payment(invoice, amount).is_err() {
        return false;
    }
    let payment = Payment::from_draft("pay".into(), NewPayment::of(amount), day(2026, 9, 15));
    invoice.apply_payment(payment);
    true
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property 1: subtotal is the exact sum of the line amounts
    #[test]
    fn prop_subtotal_is_sum_of_lines(invoice in arb_invoice()) {
        let expected: Decimal = invoice
            .items
            .iter()
            .map(|item| item.quantity * item.rate)
            .sum();
        prop_assert_eq!(invoice.subtotal, expected);

        for item in &invoice.items {
            prop_assert_eq!(item.amount, item.quantity * item.rate);
        }
    }

    /// Property 2: discount, tax and total follow from the rates
    #[test]
    fn prop_totals_formula(invoice in arb_invoice()) {
        let discount = invoice.subtotal * invoice.discount_rate / HUNDRED;
        let tax = (invoice.subtotal - discount) * invoice.tax_rate / HUNDRED;

        prop_assert_eq!(invoice.discount_amount, discount);
        prop_assert_eq!(invoice.tax_amount, tax);
        prop_assert_eq!(invoice.total, invoice.subtotal - discount + tax);
    }

    /// Property 2b: the calculator agrees with stored invoices
    #[test]
    fn prop_calculator_matches_invoice(invoice in arb_invoice()) {
        let items: Vec<LineItem> = invoice.items.clone();
        let totals = InvoiceTotals::compute(&items, invoice.tax_rate, invoice.discount_rate);
        prop_assert_eq!(totals.total, invoice.total);
        prop_assert_eq!(totals.subtotal, invoice.subtotal);
    }

    /// Property 3: balance after any accepted payments
    #[test]
    fn prop_amount_due_after_payments(
        mut invoice in arb_invoice(),
        attempts in arb_payments(),
    ) {
        let mut accepted = Decimal::ZERO;
        for cents in attempts {
            if pay(&mut invoice, cents) {
                accepted += Decimal::new(cents, 2);
            }
        }

        let recorded: Decimal = invoice.payments.iter().map(|p| p.amount).sum();
        prop_assert_eq!(recorded, accepted);
        prop_assert_eq!(invoice.amount_paid, accepted);
        prop_assert_eq!(invoice.amount_due, invoice.total - accepted);
        prop_assert!(invoice.amount_due >= Decimal::ZERO);
    }

    /// Property 4: status reflects the balances
    #[test]
    fn prop_status_matches_balances(
        mut invoice in arb_invoice(),
        attempts in arb_payments(),
    ) {
        for cents in attempts {
            pay(&mut invoice, cents);
        }

        let paid = invoice.status == InvoiceStatus::Paid;
        prop_assert_eq!(paid, invoice.amount_due <= Decimal::ZERO);

        let partial = invoice.status == InvoiceStatus::Partial;
        prop_assert_eq!(
            partial,
            invoice.amount_paid > Decimal::ZERO && invoice.amount_due > Decimal::ZERO
        );
    }

    /// Property 5: the overdue sweep is idempotent
    #[test]
    fn prop_sweep_idempotent(
        mut invoices in prop::collection::vec(arb_invoice(), 0..20),
        offset in 0u64..120,
    ) {
        let today = day(2026, 9, 1) + Days::new(offset);

        let (first, changed) = sweep_overdue(&mut invoices, today);
        prop_assert_eq!(first.newly_overdue, changed.len());

        let snapshot: Vec<InvoiceStatus> = invoices.iter().map(|inv| inv.status).collect();
        let (second, changed_again) = sweep_overdue(&mut invoices, today);

        prop_assert_eq!(second.newly_overdue, 0);
        prop_assert!(changed_again.is_empty());
        prop_assert_eq!(second.total_overdue, first.total_overdue);

        let after: Vec<InvoiceStatus> = invoices.iter().map(|inv| inv.status).collect();
        prop_assert_eq!(after, snapshot);
    }

    /// Property 5b: only pending invoices past due are swept
    #[test]
    fn prop_sweep_selects_past_due(
        mut invoices in prop::collection::vec(arb_invoice(), 1..20),
        offset in 0u64..120,
    ) {
        let today = day(2026, 9, 1) + Days::new(offset);
        let expected: Vec<bool> = invoices
            .iter()
            .map(|inv| inv.status == InvoiceStatus::Pending && inv.due_date < today)
            .collect();
        let (_, changed) = sweep_overdue(&mut invoices, today);

        for (index, invoice) in invoices.iter().enumerate() {
            let swept = changed.contains(&index);
            prop_assert_eq!(swept, expected[index]);
            if swept {
                prop_assert_eq!(invoice.status, InvoiceStatus::Overdue);
            }
        }
    }
}
