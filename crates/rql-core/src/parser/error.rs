//! Parser error type.

use thiserror::Error;

/// Error produced while parsing or validating a query.
///
/// The parser has a single failure surface: syntactic errors and
/// schema-validation errors are both reported as a `ParseError`
/// carrying a short, human-readable message that names the offending
/// input and, where applicable, the known alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// The error message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;
