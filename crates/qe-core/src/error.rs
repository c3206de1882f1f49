//! Core error types for the query engine
//!
//! Every failure here is a programmer error surfaced synchronously at the
//! call that triggered it. Nothing is retried or recovered internally.

use thiserror::Error;

/// Standard Result type for query engine operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while lowering or decoding queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// `Or` nodes cannot be lowered to an implicit-AND filter list
    #[error("Unsupported expression: OR cannot be translated to a flat filter list")]
    DisjunctionNotSupported,

    /// `Not` wrapped a comparison whose operator has no inverse
    #[error("Unsupported expression: cannot negate operator {operator}")]
    NotInvertible { operator: String },

    /// `Not` wrapped something other than a comparison
    #[error("Unsupported expression: cannot negate {node} expression")]
    NegationNotSupported { node: &'static str },

    #[error("Invalid cursor: {reason}")]
    InvalidCursor { reason: String },
}

impl QueryError {
    /// Whether this error comes from `to_filters` rejecting an expression
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            QueryError::DisjunctionNotSupported
                | QueryError::NotInvertible { .. }
                | QueryError::NegationNotSupported { .. }
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::DisjunctionNotSupported => "disjunction_not_supported",
            QueryError::NotInvertible { .. } => "not_invertible",
            QueryError::NegationNotSupported { .. } => "negation_not_supported",
            QueryError::InvalidCursor { .. } => "invalid_cursor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::NotInvertible {
            operator: "contains".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported expression: cannot negate operator contains"
        );
        assert!(err.is_unsupported());
        assert_eq!(err.error_code(), "not_invertible");
    }

    #[test]
    fn test_cursor_error_is_not_unsupported() {
        let err = QueryError::InvalidCursor {
            reason: "bad base64".to_string(),
        };
        assert!(!err.is_unsupported());
        assert_eq!(err.to_string(), "Invalid cursor: bad base64");
    }
}
