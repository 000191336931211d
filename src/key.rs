//! Store key helpers.

use crate::entity::Entity;

/// Builder for record store keys.
pub struct RecordKey;

impl RecordKey {
    /// Build the full store key for a record id.
    pub fn build<T: Entity>(id: &T::Key) -> String {
        format!("{}:{}", T::collection(), id)
    }

    /// Prefix shared by every key of a collection, used for scans.
    pub fn collection_prefix<T: Entity>() -> String {
        format!("{}:", T::collection())
    }

    /// Name of a store-owned sequence, e.g. `"invoice_number:2026"`.
    pub fn sequence(name: &str, scope: &dyn std::fmt::Display) -> String {
        format!("{}:{}", name, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Serialize, Deserialize)]
    struct Note {
        id: String,
    }

    impl Entity for Note {
        type Key = String;

        fn entity_key(&self) -> Self::Key {
            self.id.clone()
        }

        fn collection() -> &'static str {
            "note"
        }

        fn entity_name() -> &'static str {
            "Note"
        }
    }

    #[test]
    fn test_record_key() {
        let key = RecordKey::build::<Note>(&"n_123".to_string());
        assert_eq!(key, "note:n_123");
    }

    #[test]
    fn test_collection_prefix() {
        assert_eq!(RecordKey::collection_prefix::<Note>(), "note:");
    }

    #[test]
    fn test_sequence_name() {
        assert_eq!(
            RecordKey::sequence("invoice_number", &2026),
            "invoice_number:2026"
        );
    }
}
