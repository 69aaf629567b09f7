use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Calendar date format used by every seeded collection.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Possible values that can be stored in a record field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent value (e.g. a deal's closing date before closing)
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Free text or an enumerated category label
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Ordered list of values (tags, feature lists)
    List(Vec<FieldValue>),
}

// -------------------------------------------------------------------------------------------------
// Conversions between `FieldValue` and `serde_json::Value`.
// Seed data and API responses both travel as plain JSON; dates are written as `YYYY-MM-DD` and
// only read back as `Date` when the caller asks for it (see `FieldValue::from_json_as_date`).
// -------------------------------------------------------------------------------------------------

impl From<&FieldValue> for serde_json::Value {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Null => Self::Null,
            FieldValue::Boolean(b) => Self::Bool(*b),
            FieldValue::Integer(i) => Self::Number(serde_json::Number::from(*i)),
            FieldValue::Float(f) => {
                serde_json::Number::from_f64(*f).map_or(Self::Null, Self::Number)
            }
            FieldValue::Text(s) => Self::String(s.clone()),
            FieldValue::Date(d) => Self::String(d.format(DATE_FORMAT).to_string()),
            FieldValue::List(items) => Self::Array(items.iter().map(Into::into).collect()),
        }
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        Self::from(&value)
    }
}

impl TryFrom<&serde_json::Value> for FieldValue {
    type Error = anyhow::Error;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    return Err(anyhow!("Unsupported number value: {n}"));
                }
            }
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Self::List(items.iter().map(Self::try_from).collect::<Result<Vec<_>>>()?)
            }
            serde_json::Value::Object(_) => {
                return Err(anyhow!("Nested objects are not supported as field values"));
            }
        })
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use FieldValue::{Boolean, Date, Float, Integer, Null, Text};
        match (self, other) {
            (Null, Null) => Some(Ordering::Equal),
            (Text(a), Text(b)) => a.partial_cmp(b),
            (Integer(a), Integer(b)) => a.partial_cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Boolean(a), Boolean(b)) => a.partial_cmp(b),
            (Date(a), Date(b)) => a.partial_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Integer(a), Float(b)) => (*a as f64).partial_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(fl) => write!(f, "{fl}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl FieldValue {
    /// Get the type name as a string
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::List(_) => "list",
        }
    }

    /// Whether this value stands for an absent field
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text content, if this is a `Text` value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of `Integer` and `Float` values
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text a free-text query is matched against.
    ///
    /// Scalars use their display form so numbers and dates stay searchable.
    /// Lists and nulls have no single searchable text.
    #[must_use]
    pub fn search_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(s) => Some(Cow::Borrowed(s)),
            Self::Boolean(_) | Self::Integer(_) | Self::Float(_) | Self::Date(_) => {
                Some(Cow::Owned(self.to_string()))
            }
            Self::Null | Self::List(_) => None,
        }
    }

    /// Case-insensitive substring test.
    ///
    /// `needle_lower` must already be lower-cased. A list matches when any of its
    /// elements matches.
    #[must_use]
    pub fn contains_lowercase(&self, needle_lower: &str) -> bool {
        match self {
            Self::List(items) => items.iter().any(|item| item.contains_lowercase(needle_lower)),
            other => other
                .search_text()
                .is_some_and(|text| text.to_lowercase().contains(needle_lower)),
        }
    }

    /// Parse a bound typed by a user (CLI flag, query string) into a comparable value.
    ///
    /// Integers win over floats, floats over `YYYY-MM-DD` dates. Anything else is rejected.
    #[must_use]
    pub fn parse_bound(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(i) = raw.parse::<i64>() {
            return Some(Self::Integer(i));
        }
        if let Ok(f) = raw.parse::<f64>() {
            return f.is_finite().then_some(Self::Float(f));
        }
        NaiveDate::parse_from_str(raw, DATE_FORMAT).ok().map(Self::Date)
    }

    /// Convert seed JSON into a value, reading `YYYY-MM-DD` strings as dates.
    ///
    /// Used for fields a collection declares as dates; a string that is not a date stays text.
    ///
    /// # Errors
    ///
    /// Returns an error for JSON objects and unrepresentable numbers.
    pub fn from_json_as_date(value: &serde_json::Value) -> Result<Self> {
        if let serde_json::Value::String(s) = value {
            if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
                return Ok(Self::Date(date));
            }
        }
        Self::try_from(value)
    }
}
