//! Filter predicate construction
//!
//! Every list screen narrows its collection the same way: a free-text box searched
//! case-insensitively across a few fields, ANDed with dropdown selections compared
//! against single fields. This module turns those inputs into a [`Predicate`].
//!
//! ```text
//! FilterQuery ──► PredicateBuilder(schema) ──► Predicate ──► executor
//!   q, constraints,     text / category / range      all conditions ANDed
//!   ranges              conditions
//! ```
//!
//! Building never fails and evaluation never fails: a missing or `Null` field simply
//! does not satisfy any condition that names it.

use crate::error::{RltrError, RltrResult};
use crate::schema::{CategoryMatch, FilterSchema};
use crate::types::{FieldValue, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Query-string keys that never become categorical constraints
pub const RESERVED_PARAMS: [&str; 3] = ["q", "limit", "offset"];

/// A single criterion over one record
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Lower-cased `needle` is a substring of at least one of `fields`
    Text { fields: Vec<String>, needle: String },
    /// `field` matches the selected category `value`
    Category { field: String, value: String, mode: CategoryMatch },
    /// `field` lies within the inclusive bounds
    Range { field: String, min: Option<FieldValue>, max: Option<FieldValue> },
}

impl Condition {
    /// Check if a record satisfies this condition
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Condition::Text { fields, needle } => fields.iter().any(|field| {
                record.get_field(field).is_some_and(|value| value.contains_lowercase(needle))
            }),
            Condition::Category { field, value, mode } => record
                .get_field(field)
                .is_some_and(|actual| category_matches(actual, value, *mode)),
            Condition::Range { field, min, max } => match record.get_field(field) {
                Some(actual) => {
                    let above = min.as_ref().is_none_or(|lo| {
                        matches!(actual.partial_cmp(lo), Some(Ordering::Greater | Ordering::Equal))
                    });
                    let below = max.as_ref().is_none_or(|hi| {
                        matches!(actual.partial_cmp(hi), Some(Ordering::Less | Ordering::Equal))
                    });
                    above && below
                }
                None => false,
            },
        }
    }
}

fn category_matches(actual: &FieldValue, selected: &str, mode: CategoryMatch) -> bool {
    match actual {
        FieldValue::List(items) => items.iter().any(|item| category_matches(item, selected, mode)),
        other => match (other.search_text(), mode) {
            (Some(text), CategoryMatch::Exact) => text == selected,
            (Some(text), CategoryMatch::ContainsIgnoreCase) => {
                text.to_lowercase().contains(&selected.to_lowercase())
            }
            (None, _) => false,
        },
    }
}

/// Conjunction of conditions evaluated against one record at a time.
///
/// A predicate with no conditions accepts every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// The identity predicate
    pub fn always() -> Self {
        Self::default()
    }

    pub fn from_conditions(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// Combine two predicates; a record must satisfy both
    #[must_use]
    pub fn and(mut self, other: Predicate) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|condition| condition.matches(record))
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_always(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Inclusive bounds for a range constraint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub min: Option<FieldValue>,
    pub max: Option<FieldValue>,
}

/// The raw inputs of a list screen: search text, dropdown selections, range bounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub constraints: BTreeMap<String, String>,
    #[serde(default)]
    pub ranges: BTreeMap<String, RangeBounds>,
}

impl FilterQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_constraint(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.constraints.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_min(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.ranges.entry(field.into()).or_default().min = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_max(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.ranges.entry(field.into()).or_default().max = Some(value.into());
        self
    }

    /// Build a query from flat key/value pairs as they arrive in a URL query string.
    ///
    /// `q` is the search text, `min_<field>` / `max_<field>` are range bounds, `limit` and
    /// `offset` are ignored (paging is applied later), and every other key is a categorical
    /// constraint. An empty bound means "no bound".
    ///
    /// # Errors
    ///
    /// Returns [`RltrError::InvalidRangeBound`] when a bound is neither a number nor a date.
    pub fn from_params<I, K, V>(params: I) -> RltrResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();
        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            if key == "q" {
                filter.query = value.to_string();
            } else if let Some(field) = key.strip_prefix("min_") {
                filter.ranges.entry(field.to_string()).or_default().min =
                    parse_bound(field, value)?;
            } else if let Some(field) = key.strip_prefix("max_") {
                filter.ranges.entry(field.to_string()).or_default().max =
                    parse_bound(field, value)?;
            } else if !RESERVED_PARAMS.contains(&key) {
                filter.constraints.insert(key.to_string(), value.to_string());
            }
        }
        Ok(filter)
    }
}

/// Parse a user-typed range bound. Empty input means the bound is absent.
///
/// # Errors
///
/// Returns [`RltrError::InvalidRangeBound`] for input that is neither a number nor a date.
pub fn parse_bound(field: &str, raw: &str) -> RltrResult<Option<FieldValue>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    FieldValue::parse_bound(raw)
        .map(Some)
        .ok_or_else(|| RltrError::InvalidRangeBound { field: field.to_string(), raw: raw.to_string() })
}

/// Assembles a [`Predicate`] for one collection's schema
#[derive(Debug)]
pub struct PredicateBuilder<'a> {
    schema: &'a FilterSchema,
    conditions: Vec<Condition>,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(schema: &'a FilterSchema) -> Self {
        Self { schema, conditions: Vec::new() }
    }

    /// Free-text criterion over the schema's searchable fields. Empty text matches everything.
    #[must_use]
    pub fn query(mut self, text: &str) -> Self {
        if !text.is_empty() {
            self.conditions.push(Condition::Text {
                fields: self.schema.searchable.clone(),
                needle: text.to_lowercase(),
            });
        }
        self
    }

    /// Categorical criterion. The schema's sentinel leaves the field unconstrained.
    #[must_use]
    pub fn constraint(mut self, field: &str, value: &str) -> Self {
        if !self.schema.is_unconstrained(value) {
            self.conditions.push(Condition::Category {
                field: field.to_string(),
                value: value.to_string(),
                mode: self.schema.match_mode(field),
            });
        }
        self
    }

    /// Inclusive range criterion. Omitting both bounds leaves the field unconstrained.
    #[must_use]
    pub fn range(mut self, field: &str, min: Option<FieldValue>, max: Option<FieldValue>) -> Self {
        if min.is_some() || max.is_some() {
            self.conditions.push(Condition::Range { field: field.to_string(), min, max });
        }
        self
    }

    pub fn build(self) -> Predicate {
        Predicate::from_conditions(self.conditions)
    }
}

/// Build the predicate for a screen's current inputs
#[instrument(level = "debug", skip(schema))]
pub fn build_predicate(schema: &FilterSchema, filter: &FilterQuery) -> Predicate {
    let mut builder = PredicateBuilder::new(schema).query(&filter.query);
    for (field, value) in &filter.constraints {
        builder = builder.constraint(field, value);
    }
    for (field, bounds) in &filter.ranges {
        builder = builder.range(field, bounds.min.clone(), bounds.max.clone());
    }
    let predicate = builder.build();
    debug!(
        conditions = predicate.conditions().len(),
        unconstrained = predicate.is_always(),
        "Built filter predicate"
    );
    predicate
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn clients_schema() -> FilterSchema {
        FilterSchema::new().searchable(["name", "email"]).categorical("type").categorical("status")
    }

    fn sarah() -> Record {
        Record::new(1)
            .with_field("name", "Sarah Johnson")
            .with_field("email", "sarah.johnson@email.com")
            .with_field("type", "Buyer")
            .with_field("status", "Active")
    }

    #[test]
    fn empty_inputs_build_identity() {
        let predicate = build_predicate(
            &clients_schema(),
            &FilterQuery::new("").with_constraint("type", "all").with_constraint("status", "all"),
        );
        assert!(predicate.is_always());
        assert!(predicate.matches(&Record::new(99)));
    }

    #[test]
    fn text_is_case_insensitive_across_fields() {
        let schema = clients_schema();
        assert!(PredicateBuilder::new(&schema).query("SARAH").build().matches(&sarah()));
        assert!(PredicateBuilder::new(&schema).query("@EMAIL.com").build().matches(&sarah()));
        assert!(!PredicateBuilder::new(&schema).query("Buyer").build().matches(&sarah()));
    }

    #[test]
    fn category_is_case_sensitive_by_default() {
        let schema = clients_schema();
        assert!(PredicateBuilder::new(&schema).constraint("type", "Buyer").build().matches(&sarah()));
        assert!(!PredicateBuilder::new(&schema).constraint("type", "buyer").build().matches(&sarah()));
    }

    #[test]
    fn contains_mode_matches_partial_status() {
        let schema = FilterSchema::new().searchable(["clientName"]).categorical_contains("status");
        let record = Record::new(2).with_field("status", "Inspection Period");
        assert!(PredicateBuilder::new(&schema).constraint("status", "inspection").build().matches(&record));
        assert!(!PredicateBuilder::new(&schema).constraint("status", "appraisal").build().matches(&record));
    }

    #[test]
    fn unknown_constraint_key_is_non_matching() {
        let predicate = PredicateBuilder::new(&clients_schema()).constraint("colour", "Red").build();
        assert!(!predicate.matches(&sarah()));
    }

    #[test]
    fn absent_fields_fail_every_criterion() {
        let schema = FilterSchema::new().searchable(["clientName"]).date_range("closingDate");
        let open_deal = Record::new(1).with_field("closingDate", FieldValue::Null);
        let bound = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        assert!(!PredicateBuilder::new(&schema).query("a").build().matches(&open_deal));
        assert!(!PredicateBuilder::new(&schema).constraint("closingDate", "TBD").build().matches(&open_deal));
        assert!(!PredicateBuilder::new(&schema).range("closingDate", None, Some(bound.into())).build().matches(&open_deal));
    }

    #[test]
    fn ranges_are_inclusive_and_typed() {
        let schema = FilterSchema::new().range("price").range("beds");
        let home = Record::new(1).with_field("price", 450_000_i64).with_field("beds", 3_i64);

        let within = PredicateBuilder::new(&schema)
            .range("price", Some(FieldValue::Integer(450_000)), Some(FieldValue::Float(500_000.0)))
            .range("beds", Some(FieldValue::Integer(3)), None)
            .build();
        assert!(within.matches(&home));

        let too_cheap = PredicateBuilder::new(&schema).range("price", None, Some(FieldValue::Integer(449_999))).build();
        assert!(!too_cheap.matches(&home));

        let wrong_type = PredicateBuilder::new(&schema).range("price", Some("cheap".into()), None).build();
        assert!(!wrong_type.matches(&home));
    }

    #[test]
    fn list_fields_match_any_element() {
        let schema = FilterSchema::new().searchable(["name", "tags"]).categorical("tags");
        let contact = Record::new(1).with_field("name", "Mike Chen").with_field(
            "tags",
            FieldValue::List(vec!["Seller".into(), "Quick Sale".into()]),
        );
        assert!(PredicateBuilder::new(&schema).query("quick").build().matches(&contact));
        assert!(PredicateBuilder::new(&schema).constraint("tags", "Seller").build().matches(&contact));
        assert!(!PredicateBuilder::new(&schema).constraint("tags", "VIP").build().matches(&contact));
    }

    #[test]
    fn from_params_splits_keys() {
        let filter = FilterQuery::from_params([
            ("q", "main"),
            ("status", "Active"),
            ("min_price", "400000"),
            ("max_price", ""),
            ("limit", "10"),
        ])
        .unwrap();
        assert_eq!(filter.query, "main");
        assert_eq!(filter.constraints.len(), 1);
        assert_eq!(filter.ranges["price"].min, Some(FieldValue::Integer(400_000)));
        assert_eq!(filter.ranges["price"].max, None);

        let err = FilterQuery::from_params([("min_price", "cheap")]).unwrap_err();
        assert_eq!(err.category(), "invalid_range_bound");
    }

    #[test]
    fn and_combines_conditions() {
        let schema = clients_schema();
        let by_type = PredicateBuilder::new(&schema).constraint("type", "Buyer").build();
        let by_text = PredicateBuilder::new(&schema).query("mike").build();
        let both = by_type.and(by_text);
        assert_eq!(both.conditions().len(), 2);
        assert!(!both.matches(&sarah()));
    }
}
