//! Error types for SiftQL.

use thiserror::Error;

/// The main error type for SiftQL operations.
#[derive(Debug, Error)]
pub enum SiftError {
    /// Operator name outside the known vocabulary.
    #[error("Unknown operator: '{0}'")]
    UnknownOperator(String),

    /// Known operator that the target backend cannot express.
    #[error("Operator '{operator}' not supported by {backend}")]
    UnsupportedOperator {
        operator: String,
        backend: &'static str,
    },

    /// Filter shape the target backend cannot express (nesting, global leaves).
    #[error("Statement not supported by {backend}: {detail}")]
    UnsupportedStructure {
        backend: &'static str,
        detail: String,
    },

    /// A conjunction was requested without a list of search terms.
    #[error("Operator '{0}' can only be used with a list of search terms")]
    MissingChildren(String),

    /// Cursor pagination input rejected under the strict policy.
    #[error("Malformed cursor input: {0}")]
    MalformedCursor(String),

    /// Order list violates its invariants.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Failed to parse an order string or type declaration.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Position token could not be decoded into a cursor.
    #[error("Invalid position token: {0}")]
    InvalidPosition(String),

    /// An individual existence lookup failed.
    #[error("Existence check failed for id {id}: {message}")]
    ExistenceCheck { id: String, message: String },

    /// Predicate cannot be evaluated in memory.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SiftError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create an unsupported operator error for a backend.
    pub fn unsupported(operator: impl ToString, backend: &'static str) -> Self {
        Self::UnsupportedOperator {
            operator: operator.to_string(),
            backend,
        }
    }

    /// Create an unsupported structure error for a backend.
    pub fn structure(backend: &'static str, detail: impl Into<String>) -> Self {
        Self::UnsupportedStructure {
            backend,
            detail: detail.into(),
        }
    }
}

/// Result type alias for SiftQL operations.
pub type SiftResult<T> = Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SiftError::parse(5, "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at position 5: unexpected character"
        );
    }

    #[test]
    fn test_unsupported_names_operator() {
        let err = SiftError::unsupported("or", "CQL");
        assert_eq!(err.to_string(), "Operator 'or' not supported by CQL");
    }
}
