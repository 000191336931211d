//! Invoice records.
//!
//! Stored invoices always carry totals consistent with their items: every
//! constructor and patch goes through [`Invoice::refresh_totals`], see
//! `crate::billing` for the arithmetic and the payment lifecycle.

use super::merge;
use crate::entity::Entity;
use crate::error::{Error, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Largest quantity accepted on a line item.
pub const MAX_QUANTITY: i64 = 1_000_000;
/// Largest rate accepted on a line item.
pub const MAX_RATE: i64 = 1_000_000_000;
/// Most line items one invoice may carry.
pub const MAX_LINE_ITEMS: usize = 500;
/// Ceiling on a stored invoice total and amount paid.
///
/// Drafts within the line limits stay below it even at 100% tax, and sums
/// over any realistic number of invoices stay far from `Decimal::MAX`.
pub const MAX_INVOICE_TOTAL: i64 = 1_000_000_000_000_000_000;

/// Payment state of an invoice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 4] = [
        InvoiceStatus::Pending,
        InvoiceStatus::Partial,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::Validation(format!("unknown invoice status: {}", s)))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    BankTransfer,
    CreditCard,
    Check,
    Cash,
    Paypal,
    Stripe,
}

/// One billed line. `amount` is always `quantity * rate`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, rate: Decimal) -> Self {
        LineItem {
            description: description.into(),
            quantity,
            rate,
            amount: quantity * rate,
        }
    }

    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
        self.recompute();
    }

    pub fn set_rate(&mut self, rate: Decimal) {
        self.rate = rate;
        self.recompute();
    }

    /// Restore `amount = quantity * rate` after a direct field edit.
    pub fn recompute(&mut self) {
        self.amount = self.quantity * self.rate;
    }
}

impl From<NewLineItem> for LineItem {
    fn from(item: NewLineItem) -> Self {
        LineItem::new(item.description, item.quantity, item.rate)
    }
}

/// A payment recorded against an invoice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub date: NaiveDate,
    pub reference: String,
}

impl Payment {
    /// Materialize a payment draft; the date defaults to `today`.
    pub fn from_draft(id: String, draft: NewPayment, today: NaiveDate) -> Self {
        Payment {
            id,
            amount: draft.amount,
            method: draft.method,
            date: draft.date.unwrap_or(today),
            reference: draft.reference,
        }
    }
}

/// A billable record issued to a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    /// Display number, e.g. `INV-2026-007`.
    pub number: String,
    pub client_id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_address: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub items: Vec<LineItem>,
    /// Percent, 0 to 100.
    pub tax_rate: Decimal,
    /// Percent, 0 to 100.
    pub discount_rate: Decimal,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub status: InvoiceStatus,
    pub payments: Vec<Payment>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Build a pending, unpaid invoice from a validated draft.
    ///
    /// `issue_date` defaults to `today`; `due_date` to the issue date plus
    /// `payment_terms_days`.
    pub fn from_draft(
        id: String,
        number: String,
        draft: NewInvoice,
        today: NaiveDate,
        payment_terms_days: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let issue_date = draft.issue_date.unwrap_or(today);
        let due_date = draft.due_date.unwrap_or_else(|| {
            issue_date
                .checked_add_days(Days::new(u64::from(payment_terms_days)))
                .unwrap_or(issue_date)
        });

        let mut invoice = Invoice {
            id,
            number,
            client_id: draft.client_id,
            client_name: draft.client_name,
            client_email: draft.client_email,
            client_address: draft.client_address,
            issue_date,
            due_date,
            items: draft.items.into_iter().map(LineItem::from).collect(),
            tax_rate: draft.tax_rate,
            discount_rate: draft.discount_rate,
            subtotal: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total: Decimal::ZERO,
            amount_paid: Decimal::ZERO,
            amount_due: Decimal::ZERO,
            status: InvoiceStatus::Pending,
            payments: Vec::new(),
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };
        invoice.refresh_totals();
        invoice
    }

    /// Apply a patch and recompute totals, returning whether anything changed.
    pub fn apply(&mut self, patch: InvoicePatch) -> bool {
        let mut changed = merge(&mut self.client_name, patch.client_name);
        changed |= merge(&mut self.client_email, patch.client_email);
        changed |= merge(&mut self.client_address, patch.client_address);
        changed |= merge(&mut self.issue_date, patch.issue_date);
        changed |= merge(&mut self.due_date, patch.due_date);
        changed |= merge(
            &mut self.items,
            patch
                .items
                .map(|items| items.into_iter().map(LineItem::from).collect()),
        );
        changed |= merge(&mut self.tax_rate, patch.tax_rate);
        changed |= merge(&mut self.discount_rate, patch.discount_rate);
        changed |= merge(&mut self.notes, patch.notes);

        if changed {
            self.refresh_totals();
        }
        changed
    }
}

impl Entity for Invoice {
    type Key = String;

    fn entity_key(&self) -> Self::Key {
        self.id.clone()
    }

    fn collection() -> &'static str {
        "invoice"
    }

    fn entity_name() -> &'static str {
        "Invoice"
    }

    fn validate(&self) -> Result<()> {
        let ceiling = Decimal::from(MAX_INVOICE_TOTAL);
        if self.total.abs() > ceiling || self.amount_paid.abs() > ceiling {
            return Err(Error::InvalidRecord(format!(
                "invoice {} amounts exceed {}",
                self.id, ceiling
            )));
        }
        if self.items.len() > MAX_LINE_ITEMS
            || self
                .items
                .iter()
                .any(|item| !within_limit(item.quantity, MAX_QUANTITY) || !within_limit(item.rate, MAX_RATE))
        {
            return Err(Error::InvalidRecord(format!(
                "invoice {} has line items outside the accepted range",
                self.id
            )));
        }
        if self.amount_due != self.total - self.amount_paid {
            return Err(Error::InvalidRecord(format!(
                "invoice {} amount due {} does not match total {} minus paid {}",
                self.id, self.amount_due, self.total, self.amount_paid
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_percent(value: &Decimal) -> std::result::Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("percent_range")
            .with_message("must be between 0 and 100".into()));
    }
    Ok(())
}

fn within_limit(value: Decimal, max: i64) -> bool {
    value.abs() <= Decimal::from(max)
}

fn check_line_amount(value: Decimal, max: i64) -> std::result::Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative").with_message("must not be negative".into()));
    }
    if !within_limit(value, max) {
        return Err(ValidationError::new("too_large")
            .with_message(format!("must not exceed {}", max).into()));
    }
    Ok(())
}

pub(crate) fn validate_quantity(value: &Decimal) -> std::result::Result<(), ValidationError> {
    check_line_amount(*value, MAX_QUANTITY)
}

pub(crate) fn validate_rate(value: &Decimal) -> std::result::Result<(), ValidationError> {
    check_line_amount(*value, MAX_RATE)
}

pub(crate) fn validate_line_count(items: &[NewLineItem]) -> std::result::Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::new("line_items")
            .with_message("at least one line item is required".into()));
    }
    if items.len() > MAX_LINE_ITEMS {
        return Err(ValidationError::new("line_items")
            .with_message(format!("at most {} line items are allowed", MAX_LINE_ITEMS).into()));
    }
    Ok(())
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "validate_quantity"))]
    pub quantity: Decimal,
    #[validate(custom(function = "validate_rate"))]
    pub rate: Decimal,
}

impl NewLineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, rate: Decimal) -> Self {
        NewLineItem {
            description: description.into(),
            quantity,
            rate,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    #[validate(length(min = 1, message = "client id is required"))]
    pub client_id: String,
    #[validate(length(min = 1, message = "client name is required"))]
    pub client_name: String,
    #[validate(email(message = "client email is not a valid address"))]
    pub client_email: String,
    #[serde(default)]
    pub client_address: String,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_line_count"), nested)]
    pub items: Vec<NewLineItem>,
    #[serde(default)]
    #[validate(custom(function = "validate_percent"))]
    pub tax_rate: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_percent"))]
    pub discount_rate: Decimal,
    #[serde(default)]
    pub notes: String,
}

/// Partial invoice update. Replacing `items` replaces the whole list.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePatch {
    #[validate(length(min = 1, message = "client name must not be empty"))]
    pub client_name: Option<String>,
    #[validate(email(message = "client email is not a valid address"))]
    pub client_email: Option<String>,
    pub client_address: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub items: Option<Vec<NewLineItem>>,
    #[validate(custom(function = "validate_percent"))]
    pub tax_rate: Option<Decimal>,
    #[validate(custom(function = "validate_percent"))]
    pub discount_rate: Option<Decimal>,
    pub notes: Option<String>,
}

impl InvoicePatch {
    /// Field validation plus the line item rules of a new invoice.
    ///
    /// # Errors
    /// Returns `Error::Validation` for the first failing rule
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if let Some(items) = &self.items {
            validate_line_count(items).map_err(|e| {
                Error::Validation(
                    e.message
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                )
            })?;
            for item in items {
                item.validate()?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub amount: Decimal,
    #[serde(default)]
    pub method: PaymentMethod,
    /// Defaults to the day the payment is recorded.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub reference: String,
}

impl NewPayment {
    pub fn of(amount: Decimal) -> Self {
        NewPayment {
            amount,
            ..Default::default()
        }
    }
}
