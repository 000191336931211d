//! Postcard-based record encoding with versioned envelopes.
//!
//! Every record handed to a [`StoreBackend`](crate::backend::StoreBackend) is
//! wrapped in an envelope so that a backend holding bytes from another
//! application, or from an older build, is detected instead of misread.
//!
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (varint) │POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "TDSK"              u32                postcard::to_allocvec(T)
//! ```
//!
//! Money fields are `rust_decimal::Decimal` encoded as strings, and dates are
//! ISO strings, so the payload never relies on self-describing formats.
//!
//! # Example
//!
//! ```rust
//! use taskdesk::serialization::{decode_record, encode_record};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Tag {
//!     id: u64,
//!     label: String,
//! }
//!
//! # fn main() -> taskdesk::Result<()> {
//! let tag = Tag { id: 1, label: "urgent".to_string() };
//! let bytes = encode_record(&tag)?;
//! let decoded: Tag = decode_record(&bytes)?;
//! assert_eq!(tag, decoded);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Magic header for taskdesk records: b"TDSK"
pub const RECORD_MAGIC: [u8; 4] = *b"TDSK";

/// Current schema version.
///
/// Increment when a stored record type changes shape (fields added, removed,
/// reordered or retyped, enum variants changed).
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope for stored records.
///
/// ```rust
/// use taskdesk::serialization::RecordEnvelope;
///
/// let envelope = RecordEnvelope::new("data");
/// assert_eq!(envelope.magic, *b"TDSK");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecordEnvelope<T> {
    /// Magic header: must be b"TDSK"
    pub magic: [u8; 4],
    /// Schema version: must match CURRENT_SCHEMA_VERSION
    pub version: u32,
    /// The record itself
    pub payload: T,
}

impl<T> RecordEnvelope<T> {
    /// Create a new envelope with current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: RECORD_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Encode a record with its envelope.
///
/// # Errors
///
/// Returns `Error::Serialization` if Postcard encoding fails.
pub fn encode_record<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let envelope = RecordEnvelope::new(value);
    postcard::to_allocvec(&envelope).map_err(|e| {
        log::error!("Record serialization failed: {}", e);
        Error::Serialization(e.to_string())
    })
}

/// Decode a record, validating magic and schema version.
///
/// # Errors
///
/// - `Error::Deserialization`: Corrupted Postcard payload
/// - `Error::InvalidRecord`: Invalid magic header
/// - `Error::VersionMismatch`: Schema version mismatch
pub fn decode_record<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let envelope: RecordEnvelope<T> = postcard::from_bytes(bytes).map_err(|e| {
        log::error!("Record deserialization failed: {}", e);
        Error::Deserialization(e.to_string())
    })?;

    if envelope.magic != RECORD_MAGIC {
        log::warn!(
            "Invalid record: expected magic {:?}, got {:?}",
            RECORD_MAGIC,
            envelope.magic
        );
        return Err(Error::InvalidRecord(format!(
            "Invalid magic: expected {:?}, got {:?}",
            RECORD_MAGIC, envelope.magic
        )));
    }

    if envelope.version != CURRENT_SCHEMA_VERSION {
        log::warn!(
            "Record version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION,
            envelope.version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: envelope.version,
        });
    }

    Ok(envelope.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
    struct LedgerLine {
        id: u64,
        label: String,
        amount: Decimal,
        due: chrono::NaiveDate,
    }

    fn sample() -> LedgerLine {
        LedgerLine {
            id: 7,
            label: "Design retainer".to_string(),
            amount: Decimal::new(120_050, 2),
            due: chrono::NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        }
    }

    #[test]
    fn test_decimal_and_date_survive_encoding() {
        let line = sample();
        let bytes = encode_record(&line).unwrap();
        let decoded: LedgerLine = decode_record(&bytes).unwrap();

        assert_eq!(decoded.amount.to_string(), "1200.50");
        assert_eq!(decoded, line);
    }

    #[test]
    fn test_envelope_structure() {
        let bytes = encode_record(&sample()).unwrap();
        let envelope: RecordEnvelope<LedgerLine> = postcard::from_bytes(&bytes).unwrap();

        assert_eq!(envelope.magic, RECORD_MAGIC);
        assert_eq!(envelope.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(envelope.payload, sample());
    }

    #[test]
    fn test_invalid_magic_rejected() {
        let mut envelope = RecordEnvelope::new(sample());
        envelope.magic = *b"XXXX";
        let bytes = postcard::to_allocvec(&envelope).unwrap();

        let result: Result<LedgerLine> = decode_record(&bytes);
        match result.unwrap_err() {
            Error::InvalidRecord(_) => {}
            e => panic!("Expected InvalidRecord, got {:?}", e),
        }
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut envelope = RecordEnvelope::new(sample());
        envelope.version = 999;
        let bytes = postcard::to_allocvec(&envelope).unwrap();

        let result: Result<LedgerLine> = decode_record(&bytes);
        match result.unwrap_err() {
            Error::VersionMismatch { expected, found } => {
                assert_eq!(expected, CURRENT_SCHEMA_VERSION);
                assert_eq!(found, 999);
            }
            e => panic!("Expected VersionMismatch, got {:?}", e),
        }
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let mut bytes = encode_record(&sample()).unwrap();
        let len = bytes.len();
        bytes.truncate(len / 2);

        let result: Result<LedgerLine> = decode_record(&bytes);
        match result.unwrap_err() {
            Error::Deserialization(_) => {}
            e => panic!("Expected Deserialization, got {:?}", e),
        }
    }

    #[test]
    fn test_deterministic_encoding() {
        assert_eq!(
            encode_record(&sample()).unwrap(),
            encode_record(&sample()).unwrap()
        );
    }
}
