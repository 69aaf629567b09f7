//! RLTR Types
//!
//! This crate defines the value type stored in every RLTR record field. It is
//! shared by `rltr-core` (filtering, catalog) and `rltr-api` (JSON surface) so
//! neither has to know how the other maps values to and from JSON.

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(missing_docs)]

mod value;
pub use value::FieldValue;
