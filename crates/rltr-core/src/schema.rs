//! Filter schemas
//!
//! A schema says which fields of a collection the free-text query searches, which
//! fields the dropdown filters constrain and how, which fields accept range bounds,
//! and which string value of a dropdown means "no constraint".

use serde::Serialize;

/// Sentinel most screens use for an unconstrained dropdown
pub const DEFAULT_SENTINEL: &str = "all";

/// How a categorical constraint compares the selected value with a record's field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryMatch {
    /// Field equals the selected value exactly (case-sensitive)
    #[default]
    Exact,
    /// Field contains the selected value, ignoring case
    ContainsIgnoreCase,
}

/// A field that can be constrained by a dropdown selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalField {
    pub name: String,
    pub mode: CategoryMatch,
}

/// Describes how one collection is searched and filtered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSchema {
    /// Fields the free-text query is matched against
    pub searchable: Vec<String>,
    /// Fields that accept categorical constraints
    pub categorical: Vec<CategoricalField>,
    /// Numeric or date fields that accept min/max bounds
    pub ranges: Vec<String>,
    /// Fields whose `YYYY-MM-DD` strings are loaded as dates
    pub dates: Vec<String>,
    /// Constraint value meaning "unconstrained"
    pub sentinel: String,
}

impl Default for FilterSchema {
    fn default() -> Self {
        Self {
            searchable: Vec::new(),
            categorical: Vec::new(),
            ranges: Vec::new(),
            dates: Vec::new(),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

impl FilterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn searchable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn categorical(mut self, field: impl Into<String>) -> Self {
        self.categorical.push(CategoricalField { name: field.into(), mode: CategoryMatch::Exact });
        self
    }

    pub fn categorical_contains(mut self, field: impl Into<String>) -> Self {
        self.categorical.push(CategoricalField {
            name: field.into(),
            mode: CategoryMatch::ContainsIgnoreCase,
        });
        self
    }

    pub fn range(mut self, field: impl Into<String>) -> Self {
        self.ranges.push(field.into());
        self
    }

    /// Declare a date field that also accepts range bounds
    pub fn date_range(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.dates.push(field.clone());
        self.ranges.push(field);
        self
    }

    pub fn sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Match mode for a constraint key. Keys the schema does not declare compare exactly.
    pub fn match_mode(&self, field: &str) -> CategoryMatch {
        self.categorical
            .iter()
            .find(|c| c.name == field)
            .map(|c| c.mode)
            .unwrap_or_default()
    }

    pub fn is_unconstrained(&self, value: &str) -> bool {
        value == self.sentinel
    }

    pub fn is_date_field(&self, field: &str) -> bool {
        self.dates.iter().any(|d| d == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_keys_compare_exactly() {
        let schema = FilterSchema::new().searchable(["name"]).categorical_contains("status");
        assert_eq!(schema.match_mode("status"), CategoryMatch::ContainsIgnoreCase);
        assert_eq!(schema.match_mode("colour"), CategoryMatch::Exact);
    }

    #[test]
    fn sentinel_is_exact() {
        let schema = FilterSchema::new().sentinel("All");
        assert!(schema.is_unconstrained("All"));
        assert!(!schema.is_unconstrained("all"));
        assert!(FilterSchema::new().is_unconstrained("all"));
    }

    #[test]
    fn date_range_registers_both() {
        let schema = FilterSchema::new().date_range("closingDate");
        assert!(schema.is_date_field("closingDate"));
        assert_eq!(schema.ranges, vec!["closingDate".to_string()]);
    }
}
