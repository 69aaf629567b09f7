//! Immutable record storage
//!
//! A [`RecordStore`] is seeded once and then only read. It keeps records in seed
//! order, which is the order every filtered result preserves.

use crate::error::{RltrError, RltrResult};
use crate::schema::FilterSchema;
use crate::types::{FieldValue, Record, RecordId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Ordered, read-only collection of records.
///
/// Cloning is cheap: the records and the id index are shared.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Arc<[Record]>,
    id_index: Arc<HashMap<RecordId, usize>>,
}

impl RecordStore {
    /// Create a store from records in their display order.
    ///
    /// When two records share an id, lookups by id return the first one.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut id_index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            id_index.entry(record.id).or_insert(position);
        }
        Self { records: records.into(), id_index: Arc::new(id_index) }
    }

    /// Parse a JSON array of flat objects, each carrying an integer `id`.
    ///
    /// Fields the schema declares as dates are read as dates when they hold a
    /// `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Returns [`RltrError::Seed`] if the JSON is not an array of objects, a record lacks a
    /// non-negative integer `id`, or a field holds a nested object.
    #[instrument(skip(raw, schema))]
    pub fn from_json(collection: &str, raw: &str, schema: &FilterSchema) -> RltrResult<Self> {
        let parsed: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| RltrError::seed(collection, format!("invalid JSON: {e}")))?;
        let serde_json::Value::Array(items) = parsed else {
            return Err(RltrError::seed(collection, "seed data must be a JSON array"));
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let serde_json::Value::Object(object) = item else {
                return Err(RltrError::seed_record(collection, index, "record is not an object"));
            };
            let id = object.get("id").and_then(serde_json::Value::as_u64).ok_or_else(|| {
                RltrError::seed_record(collection, index, "record needs a non-negative integer id")
            })?;

            let mut fields = BTreeMap::new();
            for (name, value) in object.iter().filter(|(name, _)| name.as_str() != "id") {
                let value = if schema.is_date_field(name) {
                    FieldValue::from_json_as_date(value)
                } else {
                    FieldValue::try_from(value)
                }
                .map_err(|e| RltrError::seed_record(collection, index, format!("field '{name}': {e}")))?;
                fields.insert(name.clone(), value);
            }
            records.push(Record { id, fields });
        }

        debug!(collection, records = records.len(), "Loaded record store");
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.id_index.get(&id).map(|&position| &self.records[position])
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Record> for RecordStore {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn deals_schema() -> FilterSchema {
        FilterSchema::new().searchable(["clientName"]).date_range("closingDate")
    }

    #[test]
    fn loads_in_seed_order_with_dates() {
        let raw = r#"[
            {"id": 5, "clientName": "Lisa Thompson", "closingDate": "2024-02-15"},
            {"id": 1, "clientName": "Sarah Johnson", "closingDate": null}
        ]"#;
        let store = RecordStore::from_json("deals", raw, &deals_schema()).unwrap();
        assert_eq!(store.iter().map(|r| r.id).collect::<Vec<_>>(), vec![5, 1]);
        assert_eq!(
            store.get(5).unwrap().get_field("closingDate"),
            Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()))
        );
        assert!(store.get(1).unwrap().get_field("closingDate").is_none());
        assert!(store.get(2).is_none());
    }

    #[test]
    fn rejects_malformed_seed() {
        let schema = deals_schema();
        let missing_id = RecordStore::from_json("deals", r#"[{"clientName": "x"}]"#, &schema);
        assert!(matches!(missing_id, Err(RltrError::Seed { record_index: Some(0), .. })));

        let nested = RecordStore::from_json("deals", r#"[{"id": 1, "agent": {"name": "x"}}]"#, &schema);
        assert!(nested.is_err());

        let not_array = RecordStore::from_json("deals", r#"{"id": 1}"#, &schema);
        assert!(matches!(not_array, Err(RltrError::Seed { record_index: None, .. })));
    }

    #[test]
    fn duplicate_ids_resolve_to_first() {
        let store: RecordStore = vec![
            Record::new(1).with_field("name", "first"),
            Record::new(1).with_field("name", "second"),
        ]
        .into_iter()
        .collect();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().text("name"), Some("first"));
    }
}
