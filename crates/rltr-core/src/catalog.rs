//! Built-in RLTR collections
//!
//! Each dashboard screen lists one collection. The catalog pairs every collection with
//! its seed data and the filter schema its screen uses, so callers only pick a
//! collection and pass the screen's inputs.

use crate::error::{RltrError, RltrResult};
use crate::executor::FilterOutcome;
use crate::filter::{FilterQuery, build_predicate};
use crate::schema::FilterSchema;
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// The collections a dashboard can list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Clients,
    Deals,
    Documents,
    Transactions,
    Contacts,
    Properties,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Clients,
        Collection::Deals,
        Collection::Documents,
        Collection::Transactions,
        Collection::Contacts,
        Collection::Properties,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Clients => "clients",
            Collection::Deals => "deals",
            Collection::Documents => "documents",
            Collection::Transactions => "transactions",
            Collection::Contacts => "contacts",
            Collection::Properties => "properties",
        }
    }

    /// How the collection's screen searches and filters
    pub fn schema(self) -> FilterSchema {
        match self {
            Collection::Clients => FilterSchema::new()
                .searchable(["name", "email"])
                .categorical("type")
                .categorical("status")
                .date_range("lastContact"),
            Collection::Deals => FilterSchema::new()
                .searchable(["clientName", "propertyAddress"])
                .categorical("status")
                .range("price")
                .range("commission")
                .date_range("offerDate")
                .date_range("closingDate"),
            Collection::Documents => FilterSchema::new()
                .searchable(["name", "client", "property"])
                .categorical("category")
                .date_range("uploadDate")
                .date_range("lastModified")
                .sentinel("All"),
            Collection::Transactions => FilterSchema::new()
                .searchable(["clientName", "propertyAddress"])
                .categorical_contains("status")
                .categorical("priority")
                .range("price")
                .range("daysUntilClosing")
                .date_range("closingDate"),
            Collection::Contacts => FilterSchema::new()
                .searchable(["name", "email"])
                .categorical_contains("status")
                .categorical("priority")
                .range("relationshipScore")
                .date_range("lastContact")
                .date_range("nextFollowUp"),
            Collection::Properties => FilterSchema::new()
                .searchable(["address", "city"])
                .categorical_contains("city")
                .categorical("state")
                .categorical("status")
                .range("price")
                .range("beds")
                .range("baths")
                .range("sqft")
                .range("dom"),
        }
    }

    fn builtin_seed(self) -> &'static str {
        match self {
            Collection::Clients => include_str!("../data/clients.json"),
            Collection::Deals => include_str!("../data/deals.json"),
            Collection::Documents => include_str!("../data/documents.json"),
            Collection::Transactions => include_str!("../data/transactions.json"),
            Collection::Contacts => include_str!("../data/contacts.json"),
            Collection::Properties => include_str!("../data/properties.json"),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = RltrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|collection| collection.name() == s)
            .ok_or_else(|| RltrError::UnknownCollection { name: s.to_string() })
    }
}

/// A seeded collection together with its filter schema
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub collection: Collection,
    pub schema: FilterSchema,
    pub store: RecordStore,
}

impl CatalogEntry {
    /// Apply a screen's inputs to this collection
    pub fn search(&self, filter: &FilterQuery) -> FilterOutcome<'_> {
        let predicate = build_predicate(&self.schema, filter);
        self.store.filter(&predicate)
    }
}

/// Every collection, seeded once at startup and read-only afterwards
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: BTreeMap<Collection, CatalogEntry>,
}

impl Catalog {
    /// Seed every collection from the data compiled into the crate
    ///
    /// # Errors
    ///
    /// Returns [`RltrError::Seed`] if embedded seed data is malformed.
    pub fn builtin() -> RltrResult<Self> {
        Self::load(None)
    }

    /// Seed every collection, preferring `<data_dir>/<collection>.json` over built-in data
    ///
    /// # Errors
    ///
    /// Returns [`RltrError::Io`] if an override file exists but cannot be read, and
    /// [`RltrError::Seed`] if any seed data is malformed.
    #[instrument]
    pub fn load(data_dir: Option<&Path>) -> RltrResult<Self> {
        let mut entries = BTreeMap::new();
        for collection in Collection::ALL {
            let schema = collection.schema();
            let override_path = data_dir.map(|dir| dir.join(format!("{}.json", collection.name())));
            let store = match override_path.filter(|path| path.exists()) {
                Some(path) => {
                    debug!(%collection, path = %path.display(), "Loading seed override");
                    let raw = std::fs::read_to_string(&path).map_err(|source| RltrError::Io {
                        path: path.display().to_string(),
                        source,
                    })?;
                    RecordStore::from_json(collection.name(), &raw, &schema)?
                }
                None => RecordStore::from_json(collection.name(), collection.builtin_seed(), &schema)?,
            };
            entries.insert(collection, CatalogEntry { collection, schema, store });
        }

        info!(
            collections = entries.len(),
            records = entries.values().map(|entry| entry.store.len()).sum::<usize>(),
            "Seeded record catalog"
        );
        Ok(Self { entries })
    }

    /// Build a catalog from explicit entries (tests, embedding applications)
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        Self { entries: entries.into_iter().map(|entry| (entry.collection, entry)).collect() }
    }

    pub fn get(&self, collection: Collection) -> Option<&CatalogEntry> {
        self.entries.get(&collection)
    }

    /// Look up a collection by its name
    ///
    /// # Errors
    ///
    /// Returns [`RltrError::UnknownCollection`] for names that are not seeded.
    pub fn resolve(&self, name: &str) -> RltrResult<&CatalogEntry> {
        let collection = name.parse::<Collection>()?;
        self.get(collection).ok_or_else(|| RltrError::UnknownCollection { name: name.to_string() })
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_seeds_every_collection() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), Collection::ALL.len());
        for entry in catalog.entries() {
            assert!(!entry.store.is_empty(), "{} has no records", entry.collection);
        }
    }

    #[test]
    fn names_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(collection.name().parse::<Collection>().unwrap(), collection);
        }
        assert!(matches!(
            "listings".parse::<Collection>(),
            Err(RltrError::UnknownCollection { .. })
        ));
    }

    #[test]
    fn data_dir_override_replaces_only_its_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("clients.json"),
            r#"[{"id": 42, "name": "Ana Ortiz", "email": "ana@email.com", "type": "Seller", "status": "Active", "lastContact": "2024-03-01"}]"#,
        )
        .unwrap();

        let catalog = Catalog::load(Some(dir.path())).unwrap();
        let clients = catalog.get(Collection::Clients).unwrap();
        assert_eq!(clients.store.len(), 1);
        assert_eq!(clients.store.get(42).unwrap().text("name"), Some("Ana Ortiz"));

        let builtin = Catalog::builtin().unwrap();
        for collection in Collection::ALL.into_iter().filter(|c| *c != Collection::Clients) {
            assert_eq!(
                catalog.get(collection).unwrap().store.records(),
                builtin.get(collection).unwrap().store.records(),
                "{collection} should keep its built-in seed"
            );
        }
    }

    #[test]
    fn malformed_override_is_a_seed_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("deals.json"), r#"[{"id": 1, "clientName": "#).unwrap();

        let err = Catalog::load(Some(dir.path())).unwrap_err();
        assert!(matches!(err, RltrError::Seed { ref collection, .. } if collection == "deals"));
    }

    #[test]
    fn empty_data_dir_keeps_builtin_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::load(Some(dir.path())).unwrap();
        let builtin = Catalog::builtin().unwrap();
        for entry in catalog.entries() {
            assert_eq!(entry.store.len(), builtin.get(entry.collection).unwrap().store.len());
        }
    }

    #[test]
    fn documents_use_capitalised_sentinel() {
        let catalog = Catalog::builtin().unwrap();
        let documents = catalog.get(Collection::Documents).unwrap();
        let all = documents.search(&FilterQuery::new("").with_constraint("category", "All"));
        assert_eq!(all.len(), documents.store.len());
        let lower = documents.search(&FilterQuery::new("").with_constraint("category", "all"));
        assert!(lower.is_empty());
    }
}
