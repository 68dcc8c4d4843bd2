//! Tabular logic parser: one row per question, routing and validation as
//! expression text.
//!
//! Rows are processed in order. Each row registers its variable, parses
//! its `route` (entry guard) and `valid_response` (validation) cells, and
//! becomes one state keyed by the variable name. Transitions are inferred
//! once every row is in (see [`inference`]). Any failure aborts the whole
//! parse; no partial survey is returned.
//!
//! This layer does not simplify expressions and does not detect blocks.

use std::collections::HashMap;

use crate::ast::Expression;
use crate::config::ParserConfig;
use crate::error::{ExprError, TabularError};
use crate::model::{State, Survey, Variable, VersionRange};
use crate::parser::parse_expression_with;

mod inference;
mod table;

pub use table::Table;

pub const COL_VARIABLE: &str = "variable";
pub const COL_QUESTION: &str = "question";
pub const COL_ROUTE: &str = "route";
pub const COL_VALID_RESPONSE: &str = "valid_response";
pub const COL_APPLY_FROM: &str = "apply_from";
pub const COL_APPLY_TO: &str = "apply_to";
pub const COL_DATA_TYPE: &str = "data_type";

/// Columns every table must carry, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_VARIABLE,
    COL_QUESTION,
    COL_ROUTE,
    COL_VALID_RESPONSE,
    COL_APPLY_FROM,
];

/// Parse a table into a survey named `name` with the default parser limits.
pub fn parse_table(table: &Table, name: &str) -> Result<Survey, TabularError> {
    parse_table_with(table, name, &ParserConfig::default())
}

pub fn parse_table_with(
    table: &Table,
    name: &str,
    config: &ParserConfig,
) -> Result<Survey, TabularError> {
    let columns = Columns::resolve(table)?;

    let mut variables: Vec<Variable> = Vec::new();
    let mut states: Vec<State> = Vec::new();
    // variable name -> (index into `variables`/`states`, first row)
    let mut seen: HashMap<String, (usize, usize)> = HashMap::new();

    for row in 0..table.len() {
        let id = table.cell(row, columns.variable).trim();
        if id.is_empty() {
            tracing::debug!(row, "skipping row without a variable name");
            continue;
        }

        let text = fold_text(table.cell(row, columns.question));
        let mut variable = Variable::new(id);
        if !text.is_empty() {
            variable = variable.with_description(text.clone());
        }
        if let Some(col) = columns.data_type {
            let data_type = table.cell(row, col).trim();
            if !data_type.is_empty() {
                variable = variable.with_data_type(data_type);
            }
        }

        if let Some(&(index, first_row)) = seen.get(id) {
            let first = &variables[index];
            if first != &variable {
                return Err(TabularError::DuplicateVariable {
                    name: id.to_string(),
                    first_description: first.description.clone(),
                    description: variable.description,
                    row,
                });
            }
            let state = build_state(table, &columns, row, id, text, config)?;
            if states[index] != state {
                return Err(TabularError::DuplicateState {
                    id: id.to_string(),
                    row,
                    first_row,
                });
            }
            tracing::debug!(row, first_row, variable = id, "skipping duplicate row");
            continue;
        }

        let state = build_state(table, &columns, row, id, text, config)?;
        seen.insert(id.to_string(), (variables.len(), row));
        variables.push(variable);
        states.push(state);
        tracing::trace!(row, variable = id, "registered state");
    }

    let transitions = inference::infer_transitions(&states);

    tracing::debug!(
        survey = name,
        rows = table.len(),
        states = states.len(),
        transitions = transitions.len(),
        "parsed table"
    );

    Ok(Survey::builder(name)
        .variables(variables)
        .states(states)
        .transitions(transitions)
        .metadata("source_format", "tabular")
        .metadata("row_count", table.len().to_string())
        .build())
}

// ──────────────────────────────────────────────
// Row helpers
// ──────────────────────────────────────────────

struct Columns {
    variable: usize,
    question: usize,
    route: usize,
    valid_response: usize,
    apply_from: usize,
    apply_to: Option<usize>,
    data_type: Option<usize>,
}

impl Columns {
    fn resolve(table: &Table) -> Result<Self, TabularError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| table.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(TabularError::Schema { missing });
        }

        let required = |c: &str| table.column_index(c).unwrap_or_default();
        Ok(Columns {
            variable: required(COL_VARIABLE),
            question: required(COL_QUESTION),
            route: required(COL_ROUTE),
            valid_response: required(COL_VALID_RESPONSE),
            apply_from: required(COL_APPLY_FROM),
            apply_to: table.column_index(COL_APPLY_TO),
            data_type: table.column_index(COL_DATA_TYPE),
        })
    }
}

fn build_state(
    table: &Table,
    columns: &Columns,
    row: usize,
    id: &str,
    text: String,
    config: &ParserConfig,
) -> Result<State, TabularError> {
    let mut state = State::new(id, text);

    let route = table.cell(row, columns.route);
    if let Some(guard) = parse_cell(route, row, COL_ROUTE, config)? {
        state = state.with_entry_guard(guard);
    }
    let valid = table.cell(row, columns.valid_response);
    if let Some(validation) = parse_cell(valid, row, COL_VALID_RESPONSE, config)? {
        state = state.with_validation(validation);
    }
    if let Some(version) = parse_version(table, columns, row)? {
        state = state.with_version(version);
    }
    Ok(state)
}

fn parse_cell(
    cell: &str,
    row: usize,
    column: &str,
    config: &ParserConfig,
) -> Result<Option<Expression>, TabularError> {
    if cell.trim().is_empty() {
        return Ok(None);
    }
    parse_expression_with(cell, config)
        .map(Some)
        .map_err(|source: ExprError| TabularError::Parse {
            row,
            column: column.to_string(),
            source,
        })
}

fn parse_version(
    table: &Table,
    columns: &Columns,
    row: usize,
) -> Result<Option<VersionRange>, TabularError> {
    let from = parse_int(table.cell(row, columns.apply_from), row, COL_APPLY_FROM)?;
    let to = match columns.apply_to {
        Some(col) => parse_int(table.cell(row, col), row, COL_APPLY_TO)?,
        None => None,
    };

    match (from, to) {
        (Some(from), Some(to)) => Ok(Some(VersionRange::between(from, to))),
        (Some(from), None) => Ok(Some(VersionRange::starting(from))),
        (None, Some(to)) => {
            tracing::debug!(row, apply_to = to, "ignoring apply_to without apply_from");
            Ok(None)
        }
        (None, None) => Ok(None),
    }
}

fn parse_int(cell: &str, row: usize, column: &str) -> Result<Option<i64>, TabularError> {
    let value = cell.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| TabularError::InvalidVersion {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Trim every line, drop blank ones, join the rest with single spaces.
fn fold_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
