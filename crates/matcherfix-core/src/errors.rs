use std::fmt;
use thiserror::Error;

/// Errors raised while loading a typed configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid YAML or does not fit the schema.
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A field holds a value of the wrong type.
    #[error("invalid {field}: {source}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Decoder error for the field.
        source: serde_yaml::Error,
    },
    /// A required field is absent or empty.
    #[error("missing required field {0}")]
    MissingField(&'static str),
    /// A time of day is not `HH:MM` within `00:00..=24:00`.
    #[error("invalid time of day {0:?}")]
    InvalidTime(String),
    /// A time range does not end after it starts.
    #[error("start time {start:?} must be before end time {end:?}")]
    EmptyTimeRange {
        /// Start of the range.
        start: String,
        /// End of the range.
        end: String,
    },
    /// A weekday, day-of-month, month or year range is malformed.
    #[error("invalid {kind} range {value:?}: {reason}")]
    InvalidRange {
        /// Range kind, e.g. `weekday`.
        kind: &'static str,
        /// Offending text.
        value: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Which of the two compared documents an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    /// The first argument.
    First,
    /// The second argument.
    Second,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Document::First => f.write_str("first"),
            Document::Second => f.write_str("second"),
        }
    }
}

/// Errors raised by the equivalence checker.
#[derive(Error, Debug)]
pub enum EquivalenceError {
    /// One of the documents could not be parsed into a typed configuration.
    #[error("failed to load {document} configuration: {source}")]
    SchemaDecode {
        /// Which document failed.
        document: Document,
        /// Why it failed.
        source: ConfigError,
    },
}

impl EquivalenceError {
    /// The document the error belongs to.
    pub fn document(&self) -> Document {
        match self {
            EquivalenceError::SchemaDecode { document, .. } => *document,
        }
    }
}
