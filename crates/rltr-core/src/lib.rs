#![deny(warnings)]
#![allow(missing_docs)]
//! Core functionality for RLTR record filtering.
//!
//! Every RLTR list screen narrows a fixed, in-memory collection of records by free
//! text and dropdown selections. This crate implements that once: filter schemas
//! describe a collection, the predicate builder turns screen inputs into a
//! [`Predicate`], and the executor applies it to a [`RecordStore`] preserving order.

/// Built-in collections, their schemas and seed data
pub mod catalog;
/// Error types for loading and edge parsing
pub mod error;
/// Order-preserving filter execution
pub mod executor;
/// Predicate construction from search text, constraints and ranges
pub mod filter;
/// Limit/offset windows over filtered results
pub mod page;
/// Per-collection filter schemas
pub mod schema;
/// Immutable record storage
pub mod store;
/// Record and field types
pub mod types;

pub use catalog::{Catalog, CatalogEntry, Collection};
pub use error::{ErrorSeverity, RltrError, RltrResult};
pub use executor::{FilterOutcome, filter_records};
pub use filter::{Condition, FilterQuery, Predicate, PredicateBuilder, RangeBounds, build_predicate};
pub use page::{Page, PageLimits, PagedResult};
pub use schema::{CategoricalField, CategoryMatch, FilterSchema};
pub use store::RecordStore;
pub use types::{FieldValue, Record, RecordId};
