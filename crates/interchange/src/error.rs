use thiserror::Error;

/// Errors during interchange encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterchangeError {
    #[error("{entity}: missing required field '{field}'")]
    MissingField { entity: String, field: String },

    #[error("{entity}: field '{field}' must be {expected}")]
    WrongType {
        entity: String,
        field: String,
        expected: &'static str,
    },

    #[error("unknown expression type '{tag}'")]
    UnknownExpressionType { tag: String },

    #[error("unknown {kind} operator '{symbol}'")]
    UnknownOperator { kind: &'static str, symbol: String },

    /// An expression tree is nested deeper than the format carries.
    #[error("expression nesting exceeds maximum depth {limit}")]
    DepthExceeded { limit: usize },

    /// The input text was not JSON at all.
    #[error("invalid JSON: {0}")]
    Json(String),
}
