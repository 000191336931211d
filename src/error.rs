//! Error types for taskdesk.

use thiserror::Error;

/// Result type for store and service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for taskdesk.
///
/// Every repository and service call returns `Result<T>`. Callers in the
/// dashboard surface a generic failure for anything but `NotFound` and
/// `Validation`, so the variants describe failure modes rather than recovery
/// paths.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Lookup by id found nothing.
    ///
    /// Raised by `get_by_id`, `update`, `delete` and every other operation
    /// addressing a single record. Displays as `"<Entity> not found"`.
    #[error("{entity} not found")]
    NotFound {
        /// Human-readable entity name, e.g. `"Invoice"` or `"Time entry"`.
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// Input rejected before it reached the store.
    ///
    /// Covers missing required fields, malformed email addresses,
    /// percentages outside `[0, 100]`, and payments that are not positive
    /// or exceed the amount due.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Encoding a record for storage failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Decoding stored bytes or a fixture document failed.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Stored bytes do not carry the taskdesk envelope magic.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Stored record was written with a different schema version.
    #[error("Record version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from stored record)
        found: u32,
    },

    /// Record store unavailable or failed.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with custom message.
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Build a not-found error for an entity name and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// True when the error is a failed id lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True when retrying the same call may succeed.
    ///
    /// Only store failures qualify; lookups and validation fail the same way
    /// every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Backend(_))
    }
}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::Backend(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::Deserialization(e.to_string())
        } else {
            Error::Serialization(e.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(e: validator::ValidationErrors) -> Self {
        Error::Validation(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("Invoice", "inv-1");
        assert_eq!(err.to_string(), "Invoice not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = Error::Validation("Test".to_string());
        assert_eq!(err.to_string(), "Validation error: Test");
        assert!(!err.is_not_found());
        assert!(!err.is_transient());
        assert!(Error::Backend("down".into()).is_transient());
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "test error".into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_error_from_json_syntax() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Deserialization(_)));
    }
}
