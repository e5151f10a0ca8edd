//! Error types for metadata marshalling

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single schema validity problem found while validating a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ValidityError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.column, self.message)
    }
}

/// Errors that can occur while converting between XML and entity graphs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetadataError {
    /// The document is not well-formed XML
    #[error("XML error at line {line}, column {column}: {message}")]
    Xml {
        line: usize,
        column: usize,
        message: String,
    },

    /// An element was handed to a builder that does not accept its tag
    #[error("Element <{found}> cannot be built as {expected}")]
    SchemaMismatch { expected: String, found: String },

    /// A scalar attribute could not be coerced to its target type
    #[error("Cannot convert {field}=\"{value}\" to {target}")]
    Conversion {
        field: String,
        value: String,
        target: &'static str,
    },

    /// Schema validation failed; every problem found is carried
    #[error("Document failed validation with {} error(s)", .0.len())]
    Validity(Vec<ValidityError>),

    /// Base64 payload could not be encoded or decoded
    #[error("Encoding error on {field}: {message}")]
    Encoding { field: String, message: String },

    /// Unknown attribute or element encountered in strict mode
    #[error("Unknown {name} in {context}")]
    UnknownConstruct { context: String, name: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MetadataError {
    pub(crate) fn conversion(field: &str, value: &str, target: &'static str) -> Self {
        MetadataError::Conversion {
            field: field.to_string(),
            value: value.to_string(),
            target,
        }
    }

    /// Validity errors carried by this error, if any
    pub fn validity_errors(&self) -> &[ValidityError] {
        match self {
            MetadataError::Validity(errors) => errors,
            _ => &[],
        }
    }
}

impl From<std::io::Error> for MetadataError {
    fn from(e: std::io::Error) -> Self {
        MetadataError::Io(e.to_string())
    }
}

impl From<toml::de::Error> for MetadataError {
    fn from(e: toml::de::Error) -> Self {
        MetadataError::Config(e.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MetadataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_error_display() {
        let e = ValidityError::new(3, 14, "unexpected element <Foo>");
        assert_eq!(e.to_string(), "line 3, column 14: unexpected element <Foo>");
    }

    #[test]
    fn test_validity_count_in_message() {
        let e = MetadataError::Validity(vec![
            ValidityError::new(1, 1, "a"),
            ValidityError::new(2, 1, "b"),
        ]);
        assert_eq!(e.to_string(), "Document failed validation with 2 error(s)");
        assert_eq!(e.validity_errors().len(), 2);
    }
}
