//! Invoice numbers: `{prefix}-{year}-{seq}`.
//!
//! Sequences are owned by the record store and only move forward, so a
//! number is never reused after a delete.

use crate::backend::StoreBackend;
use crate::error::{Error, Result};
use crate::key::RecordKey;
use std::fmt;
use std::str::FromStr;

/// Sequence family used for invoice numbers, one counter per year.
pub const INVOICE_SEQUENCE: &str = "invoice_number";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InvoiceNumber {
    pub prefix: String,
    pub year: i32,
    pub seq: u64,
    /// Zero-padding width of `seq`.
    pub width: usize,
}

impl InvoiceNumber {
    /// Take the next number for `year` from the store.
    ///
    /// # Errors
    /// Returns `Err` if the store cannot advance the sequence
    pub async fn next<B: StoreBackend>(
        backend: &B,
        prefix: &str,
        width: usize,
        year: i32,
    ) -> Result<Self> {
        let seq = backend
            .next_sequence(&RecordKey::sequence(INVOICE_SEQUENCE, &year))
            .await?;

        Ok(InvoiceNumber {
            prefix: prefix.to_string(),
            year,
            seq,
            width,
        })
    }

    /// Make sure later calls to [`InvoiceNumber::next`] never hand out this
    /// number again.
    ///
    /// # Errors
    /// Returns `Err` if the store cannot advance the sequence
    pub async fn reserve<B: StoreBackend>(&self, backend: &B) -> Result<()> {
        backend
            .advance_sequence(&RecordKey::sequence(INVOICE_SEQUENCE, &self.year), self.seq)
            .await
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:0width$}",
            self.prefix,
            self.year,
            self.seq,
            width = self.width
        )
    }
}

impl FromStr for InvoiceNumber {
    type Err = Error;

    /// Parse `PREFIX-YYYY-NNN`. The prefix may itself contain dashes.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Validation(format!("invalid invoice number: {}", s));

        let mut parts = s.rsplitn(3, '-');
        let seq_part = parts.next().ok_or_else(invalid)?;
        let year_part = parts.next().ok_or_else(invalid)?;
        let prefix = parts.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;

        if seq_part.is_empty() || !seq_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        Ok(InvoiceNumber {
            prefix: prefix.to_string(),
            year: year_part.parse().map_err(|_| invalid())?,
            seq: seq_part.parse().map_err(|_| invalid())?,
            width: seq_part.len(),
        })
    }
}
