//! Core trait that every stored record implements.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::Hash;

/// Trait that all records kept in a record store must implement.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use taskdesk::Entity;
///
/// #[derive(Clone, Serialize, Deserialize)]
/// pub struct Note {
///     pub id: String,
///     pub body: String,
/// }
///
/// impl Entity for Note {
///     type Key = String;
///
///     fn entity_key(&self) -> Self::Key {
///         self.id.clone()
///     }
///
///     fn collection() -> &'static str {
///         "note"
///     }
///
///     fn entity_name() -> &'static str {
///         "Note"
///     }
/// }
/// ```
pub trait Entity: Send + Sync + Serialize + for<'de> Deserialize<'de> + Clone {
    /// Type of the record's id.
    type Key: Display + Clone + Send + Sync + Eq + Hash + 'static;

    /// Return the record's unique id.
    fn entity_key(&self) -> Self::Key;

    /// Collection name used to namespace store keys.
    ///
    /// Final store key format: `"{collection}:{id}"`
    fn collection() -> &'static str;

    /// Human-readable name used in `"<Entity> not found"` errors.
    fn entity_name() -> &'static str;

    /// Encode the record for storage.
    ///
    /// Uses Postcard inside a versioned envelope, see `crate::serialization`.
    fn encode(&self) -> Result<Vec<u8>> {
        crate::serialization::encode_record(self)
    }

    /// Decode a record from storage, validating magic and schema version.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidRecord`: Bad magic or corrupted envelope
    /// - `Error::VersionMismatch`: Schema version changed
    /// - `Error::Deserialization`: Corrupted payload
    fn decode(bytes: &[u8]) -> Result<Self> {
        crate::serialization::decode_record(bytes)
    }

    /// Optional: check record consistency after decoding.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}
