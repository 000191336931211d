//! Invoice totals calculator.
//!
//! Amounts stay exact until display: the calculator never rounds, and
//! [`round_for_display`] is the only place a scale is imposed.

use crate::models::LineItem;
use rust_decimal::prelude::*;

/// Decimal places shown for money.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Aggregate amounts of an invoice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Compute totals for a set of line items.
    ///
    /// The discount is taken off the subtotal first and tax applies to what
    /// remains. Percentages are used as given; range checks belong to the
    /// caller. Items within [`MAX_QUANTITY`](crate::models::MAX_QUANTITY)
    /// and [`MAX_RATE`](crate::models::MAX_RATE) cannot overflow.
    pub fn compute(items: &[LineItem], tax_rate: Decimal, discount_rate: Decimal) -> Self {
        let subtotal: Decimal = items.iter().map(|item| item.quantity * item.rate).sum();
        let discount_amount = subtotal * discount_rate / Decimal::ONE_HUNDRED;
        let taxable = subtotal - discount_amount;
        let tax_amount = taxable * tax_rate / Decimal::ONE_HUNDRED;

        InvoiceTotals {
            subtotal,
            discount_amount,
            tax_amount,
            total: taxable + tax_amount,
        }
    }
}

/// Round a money amount to two places, half away from zero.
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}
