use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use rltr_types::FieldValue;

/// Unique identifier for records within one collection
pub type RecordId = u64;

/// A single domain entity (client, deal, document, ...) held in a record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self { id, fields: BTreeMap::new() }
    }

    /// Builder-style field setter, mainly used by tests and benches
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field value. `Null` counts as absent.
    pub fn get_field(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    /// Convenience accessor for text fields
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get_field(field).and_then(FieldValue::as_text)
    }
}
