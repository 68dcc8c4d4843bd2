//! cslm-core: canonical survey logic model.
//!
//! Survey routing logic (questions, branching conditions, validation rules)
//! represented as a guarded state machine over typed expression trees.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Expression`], [`BinaryOp`], [`UnaryOp`], [`Literal`] -- expression trees
//! - [`Survey`], [`SurveyBuilder`], [`State`], [`Transition`], [`Variable`],
//!   [`Block`], [`VersionRange`] -- the survey model
//! - [`parse_expression()`] -- routing/validation expression text to AST
//! - [`parse_table()`] -- one-row-per-question tables to a [`Survey`]
//! - [`SyntaxError`], [`ExprError`], [`TabularError`], [`ConfigError`]

pub mod ast;
pub mod config;
pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod tabular;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{BinaryOp, Expression, Literal, UnaryOp};
pub use config::ParserConfig;
pub use error::{ConfigError, ExprError, SyntaxError, SyntaxErrorKind, TabularError};
pub use model::{
    is_sentinel, Block, State, Survey, SurveyBuilder, SurveyIndex, Transition, Variable,
    VersionRange, END, START,
};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use parser::{parse_expression, parse_expression_with};
pub use tabular::{parse_table, parse_table_with, Table};
