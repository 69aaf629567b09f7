//! Error handling for the RLTR core library
//!
//! Filtering itself never fails. Errors only arise at the edges: loading seed data,
//! reading configuration, resolving a collection name, or parsing a range bound
//! typed by a user.

use std::fmt;
use thiserror::Error;

/// Error type for RLTR core operations
#[derive(Error, Debug)]
pub enum RltrError {
    /// Configuration file could not be parsed or holds an invalid value
    #[error("Configuration error: {message}")]
    Configuration { message: String, setting: Option<String> },

    /// Seed data for a collection is malformed
    #[error("Seed error in '{collection}': {message}")]
    Seed { collection: String, message: String, record_index: Option<usize> },

    /// No collection with the requested name exists
    #[error("Unknown collection: {name}")]
    UnknownCollection { name: String },

    /// A range bound is neither a number nor a `YYYY-MM-DD` date
    #[error("Invalid range bound for '{field}': {raw}")]
    InvalidRangeBound { field: String, raw: String },

    /// Reading seed or configuration files failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl RltrError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            RltrError::Configuration { .. } => "configuration",
            RltrError::Seed { .. } => "seed",
            RltrError::UnknownCollection { .. } => "unknown_collection",
            RltrError::InvalidRangeBound { .. } => "invalid_range_bound",
            RltrError::Io { .. } => "io",
        }
    }

    /// Whether the error was caused by caller input rather than the deployment
    pub fn is_user_error(&self) -> bool {
        matches!(self, RltrError::UnknownCollection { .. } | RltrError::InvalidRangeBound { .. })
    }

    /// Create a seed error for a specific record
    pub fn seed_record(collection: &str, record_index: usize, message: impl Into<String>) -> Self {
        Self::Seed {
            collection: collection.to_string(),
            message: message.into(),
            record_index: Some(record_index),
        }
    }

    /// Create a seed error that is not tied to a single record
    pub fn seed(collection: &str, message: impl Into<String>) -> Self {
        Self::Seed { collection: collection.to_string(), message: message.into(), record_index: None }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>, setting: Option<&str>) -> Self {
        Self::Configuration { message: message.into(), setting: setting.map(str::to_string) }
    }
}

/// Lower-case label used when errors are reported in structured logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Bad input from a caller
    Warning,
    /// The process cannot serve requests correctly
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Fatal => write!(f, "fatal"),
        }
    }
}

impl RltrError {
    /// Severity used when logging the error
    pub fn severity(&self) -> ErrorSeverity {
        if self.is_user_error() { ErrorSeverity::Warning } else { ErrorSeverity::Fatal }
    }
}

/// Result type alias for core operations
pub type RltrResult<T> = Result<T, RltrError>;
