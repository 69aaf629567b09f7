//! Filter execution
//!
//! Applies a [`Predicate`] to every record of a store and keeps the matches in
//! store order. No sorting, no deduplication, no paging: those belong to the caller.

use crate::filter::Predicate;
use crate::page::{Page, PagedResult};
use crate::store::RecordStore;
use crate::types::Record;
use tracing::{debug, instrument};

/// Records that satisfied a predicate, borrowed from the store they came from
#[derive(Debug, Clone)]
pub struct FilterOutcome<'a> {
    matches: Vec<&'a Record>,
    scanned: usize,
}

impl<'a> FilterOutcome<'a> {
    pub fn records(&self) -> &[&'a Record] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Number of records the predicate was evaluated against
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    pub fn ids(&self) -> Vec<u64> {
        self.matches.iter().map(|record| record.id).collect()
    }

    /// Copy the matches into a new store, e.g. to filter again
    pub fn to_store(&self) -> RecordStore {
        self.matches.iter().map(|&record| record.clone()).collect()
    }

    pub fn page(&self, page: Page) -> PagedResult<Record> {
        PagedResult {
            items: page.apply(&self.matches).iter().map(|&record| record.clone()).collect(),
            total: self.matches.len(),
            limit: page.limit,
            offset: page.offset,
        }
    }
}

/// Keep the records that satisfy `predicate`, in their original order
pub fn filter_records<'a, I>(records: I, predicate: &Predicate) -> FilterOutcome<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut scanned = 0;
    let matches = records
        .into_iter()
        .inspect(|_| scanned += 1)
        .filter(|record| predicate.matches(record))
        .collect();
    FilterOutcome { matches, scanned }
}

impl RecordStore {
    /// Run a predicate over the whole store
    #[instrument(level = "debug", skip_all, fields(records = self.len()))]
    pub fn filter(&self, predicate: &Predicate) -> FilterOutcome<'_> {
        let outcome = filter_records(self.iter(), predicate);
        debug!(scanned = outcome.scanned(), matched = outcome.len(), "Filtered record store");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Condition, FilterQuery, build_predicate};
    use crate::schema::FilterSchema;

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            Record::new(2).with_field("name", "Mike Chen").with_field("type", "Seller").with_field("status", "Active"),
            Record::new(1).with_field("name", "Sarah Johnson").with_field("type", "Buyer").with_field("status", "Active"),
        ])
    }

    fn schema() -> FilterSchema {
        FilterSchema::new().searchable(["name"]).categorical("type").categorical("status")
    }

    #[test]
    fn always_returns_store_in_order() {
        let store = store();
        let outcome = store.filter(&Predicate::always());
        assert_eq!(outcome.ids(), vec![2, 1]);
        assert_eq!(outcome.scanned(), 2);
    }

    #[test]
    fn conjunctive_type_filter() {
        let store = store();
        let predicate = build_predicate(&schema(), &FilterQuery::new("").with_constraint("type", "Buyer"));
        let outcome = store.filter(&predicate);
        assert_eq!(outcome.len(), 1);
        assert_eq!(outcome.records()[0].text("name"), Some("Sarah Johnson"));
    }

    #[test]
    fn text_and_status_combined() {
        let store = store();
        let predicate = build_predicate(&schema(), &FilterQuery::new("o").with_constraint("status", "Active"));
        assert_eq!(store.filter(&predicate).ids(), vec![1]);
    }

    #[test]
    fn no_match_is_empty() {
        let predicate = build_predicate(&schema(), &FilterQuery::new("zzz-nonexistent"));
        assert!(store().filter(&predicate).is_empty());
    }

    #[test]
    fn empty_store_yields_empty_outcome() {
        let store = RecordStore::default();
        let outcome = store.filter(&Predicate::always());
        assert!(outcome.is_empty());
        assert_eq!(outcome.scanned(), 0);
    }

    #[test]
    fn paging_reports_total() {
        let store = store();
        let outcome = store.filter(&Predicate::from_conditions(vec![Condition::Category {
            field: "status".into(),
            value: "Active".into(),
            mode: Default::default(),
        }]));
        let page = outcome.page(Page { limit: 1, offset: 1 });
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, 1);
    }
}
