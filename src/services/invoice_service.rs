//! Invoice service: CRUD plus payments, the overdue sweep and reporting.

use super::{check, today, trim_in_place, CrudService};
use crate::backend::StoreBackend;
use crate::billing::{check_payment, revenue_by_month, FinancialSummary, InvoiceNumber, SweepReport};
use crate::config::Config;
use crate::entity::Entity;
use crate::error::Result;
use crate::models::{new_id, Invoice, InvoicePatch, InvoiceStatus, NewInvoice, NewPayment, Payment};
use crate::repository::{Repository, StoreRepository};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Clone)]
pub struct InvoiceService<B: StoreBackend> {
    repo: StoreRepository<Invoice, B>,
    config: Arc<Config>,
}

impl<B: StoreBackend> InvoiceService<B> {
    pub fn new(repo: StoreRepository<Invoice, B>, config: Arc<Config>) -> Self {
        InvoiceService { repo, config }
    }

    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn get_by_status(&self, status: InvoiceStatus) -> Result<Vec<Invoice>> {
        let invoices = self.repo.fetch_all().await?;
        Ok(invoices.into_iter().filter(|inv| inv.status == status).collect())
    }

    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn get_by_client(&self, client_id: &str) -> Result<Vec<Invoice>> {
        let invoices = self.repo.fetch_all().await?;
        Ok(invoices
            .into_iter()
            .filter(|inv| inv.client_id == client_id)
            .collect())
    }

    /// Record a payment against an invoice.
    ///
    /// The payment is dated today unless the draft carries a date.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for an unknown invoice and
    /// `Error::Validation` for a non-positive amount or one above the amount
    /// due
    pub async fn add_payment(&self, invoice_id: &str, draft: NewPayment) -> Result<Invoice> {
        let amount = draft.amount;
        let payment = Payment::from_draft(new_id("pay"), draft, today());

        // Checked against the stored balance inside the write, so concurrent
        // payments each see the previous one.
        let invoice = self
            .repo
            .modify(&invoice_id.to_string(), |invoice| {
                check_payment(invoice, amount)?;
                invoice.apply_payment(payment);
                invoice.updated_at = Utc::now();
                Ok(invoice.clone())
            })
            .await
            .inspect_err(|e| {
                if !e.is_not_found() {
                    warn!("Rejected payment on invoice {}: {}", invoice_id, e);
                }
            })?;

        info!(
            "Recorded payment of {} on invoice {} (due {}, status {})",
            amount, invoice.number, invoice.amount_due, invoice.status
        );
        Ok(invoice)
    }

    /// Mark every pending invoice whose due date has passed as overdue.
    ///
    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn mark_overdue(&self) -> Result<SweepReport> {
        self.mark_overdue_as_of(today()).await
    }

    /// Overdue sweep against an explicit calendar day.
    ///
    /// Each invoice is flipped on its own, re-checked against its stored
    /// state. Invoices deleted or paid while the sweep runs are skipped.
    ///
    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn mark_overdue_as_of(&self, today: NaiveDate) -> Result<SweepReport> {
        let invoices = self.repo.fetch_all().await?;
        let already_overdue = invoices
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Overdue)
            .count();
        let candidates: Vec<String> = invoices
            .into_iter()
            .filter(|inv| inv.is_past_due(today))
            .map(|inv| inv.id)
            .collect();

        let now = Utc::now();
        let mut newly_overdue = 0;
        for id in candidates {
            let flipped = self
                .repo
                .modify(&id, |invoice| {
                    let changed = invoice.mark_overdue_if_due(today);
                    if changed {
                        invoice.updated_at = now;
                    }
                    Ok(changed)
                })
                .await;

            match flipped {
                Ok(true) => {
                    newly_overdue += 1;
                    debug!("Invoice {} is now overdue", id);
                }
                Ok(false) => debug!("Invoice {} changed during the sweep, skipped", id),
                Err(e) if e.is_not_found() => {
                    debug!("Invoice {} was deleted during the sweep, skipped", id)
                }
                Err(e) => return Err(e),
            }
        }

        let report = SweepReport {
            newly_overdue,
            total_overdue: already_overdue + newly_overdue,
        };
        if report.newly_overdue > 0 {
            info!(
                "Overdue sweep for {}: {} newly overdue, {} overdue in total",
                today, report.newly_overdue, report.total_overdue
            );
        }
        Ok(report)
    }

    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn financial_summary(&self) -> Result<FinancialSummary> {
        let invoices = self.repo.fetch_all().await?;
        Ok(FinancialSummary::from_invoices(&invoices))
    }

    /// Paid revenue for each month of `year`.
    ///
    /// # Errors
    /// Returns `Err` if the store fails
    pub async fn revenue_by_month(&self, year: i32) -> Result<[Decimal; 12]> {
        let invoices = self.repo.fetch_all().await?;
        Ok(revenue_by_month(&invoices, year))
    }

    /// Store complete invoices and move numbering past their numbers.
    ///
    /// Numbers that do not follow the `{prefix}-{year}-{seq}` shape are kept
    /// as they are and do not affect numbering.
    ///
    /// # Errors
    /// Returns `Error::InvalidRecord` for an invoice whose balances disagree,
    /// `Error::Validation` on a duplicate id
    pub async fn import(&self, invoices: Vec<Invoice>) -> Result<usize> {
        let count = invoices.len();
        for invoice in &invoices {
            Entity::validate(invoice)?;
            match invoice.number.parse::<InvoiceNumber>() {
                Ok(number) => number.reserve(self.repo.backend()).await?,
                Err(_) => warn!("Imported invoice {} has an unnumbered format", invoice.id),
            }
            self.repo.insert(invoice).await?;
        }
        debug!("Imported {} invoice(s)", count);
        Ok(count)
    }
}

impl<B: StoreBackend> CrudService for InvoiceService<B> {
    type Entity = Invoice;
    type Draft = NewInvoice;
    type Patch = InvoicePatch;

    async fn get_all(&self) -> Result<Vec<Invoice>> {
        self.repo.fetch_all().await
    }

    async fn get_by_id(&self, id: &str) -> Result<Invoice> {
        self.repo.require(&id.to_string()).await
    }

    async fn create(&self, mut draft: NewInvoice) -> Result<Invoice> {
        trim_in_place(&mut draft.client_name);
        trim_in_place(&mut draft.client_email);
        check("invoice", &draft)?;

        let today = today();
        let number = InvoiceNumber::next(
            self.repo.backend(),
            &self.config.invoice_prefix,
            self.config.invoice_number_width,
            today.year(),
        )
        .await?;

        let invoice = Invoice::from_draft(
            new_id("inv"),
            number.to_string(),
            draft,
            today,
            self.config.payment_terms_days,
            Utc::now(),
        );
        self.repo.insert(&invoice).await?;
        info!(
            "Created invoice {} for {} (total {})",
            invoice.number, invoice.client_name, invoice.total
        );
        Ok(invoice)
    }

    async fn update(&self, id: &str, patch: InvoicePatch) -> Result<Invoice> {
        patch.check().inspect_err(|e| warn!("Rejected invoice input: {}", e))?;

        let (invoice, changed) = self
            .repo
            .modify(&id.to_string(), |invoice| {
                let changed = invoice.apply(patch);
                if changed {
                    invoice.updated_at = Utc::now();
                }
                Ok((invoice.clone(), changed))
            })
            .await?;
        if changed {
            info!("Updated invoice {} (total {})", invoice.number, invoice.total);
        }
        Ok(invoice)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.repo.remove(&id.to_string()).await?;
        info!("Deleted invoice {}", id);
        Ok(())
    }
}
