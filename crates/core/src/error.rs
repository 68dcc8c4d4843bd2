//! Error types for expression parsing, tabular parsing, and configuration.
//!
//! Every failure is a tagged enum variant with structured fields so callers
//! can branch on the kind without inspecting messages.

use thiserror::Error;

/// The reason an expression failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// `(` without a matching `)`, or a stray `)`.
    UnmatchedParen,
    /// A complete expression was followed by more tokens.
    TrailingTokens,
    /// An operand was expected but the input ended or an operator appeared.
    EmptyOperand,
    /// A character or character sequence that is not part of the grammar.
    UnknownOperator,
    /// A numeric literal that cannot be read as an integer or float.
    MalformedNumber,
    /// A quoted text literal that is never closed.
    UnterminatedString,
}

impl SyntaxErrorKind {
    pub fn describe(&self) -> &'static str {
        match self {
            SyntaxErrorKind::UnmatchedParen => "unmatched parenthesis",
            SyntaxErrorKind::TrailingTokens => "unexpected trailing tokens",
            SyntaxErrorKind::EmptyOperand => "missing operand",
            SyntaxErrorKind::UnknownOperator => "unknown operator",
            SyntaxErrorKind::MalformedNumber => "malformed numeric literal",
            SyntaxErrorKind::UnterminatedString => "unterminated text literal",
        }
    }
}

/// An expression grammar violation.
///
/// `offset` is the 0-based character offset of `fragment` in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} at offset {offset}: '{fragment}'", .kind.describe())]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub fragment: String,
    pub offset: usize,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, fragment: impl Into<String>, offset: usize) -> Self {
        SyntaxError {
            kind,
            fragment: fragment.into(),
            offset,
        }
    }
}

/// Failure of a single expression parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Nesting (or the resulting tree) went deeper than the configured limit.
    #[error("expression nesting exceeds maximum depth {limit} at offset {offset}")]
    DepthExceeded { limit: usize, offset: usize },
}

impl ExprError {
    /// Character offset of the failure within the expression text.
    pub fn offset(&self) -> usize {
        match self {
            ExprError::Syntax(e) => e.offset,
            ExprError::DepthExceeded { offset, .. } => *offset,
        }
    }
}

/// Failure of a tabular parse. No partial survey is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabularError {
    /// Required columns are absent; raised before any row is read.
    #[error("missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A cell expression failed to parse. `row` is the 0-based data row.
    #[error("row {row}, column '{column}': {source}")]
    Parse {
        row: usize,
        column: String,
        #[source]
        source: ExprError,
    },

    #[error(
        "row {row}: variable '{name}' redeclared with description {description:?} \
         (first declared as {first_description:?})"
    )]
    DuplicateVariable {
        name: String,
        first_description: Option<String>,
        description: Option<String>,
        row: usize,
    },

    #[error("row {row}: duplicate state id '{id}' (first declared in row {first_row})")]
    DuplicateState {
        id: String,
        row: usize,
        first_row: usize,
    },

    #[error("row {row}, column '{column}': '{value}' is not an integer version")]
    InvalidVersion {
        row: usize,
        column: String,
        value: String,
    },
}

/// Invalid configuration text.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration value for '{field}': {message}")]
    Invalid { field: String, message: String },
}
