//! Decoding of interchange values back into model entities.
//!
//! Decoding is strict about shape and lenient about absence: a required
//! field that is missing or of the wrong JSON type is an error, while an
//! optional field may be omitted or `null`. No structural checks are made
//! here; a decoded survey is exactly what the value describes.

use cslm_core::{
    BinaryOp, Block, Expression, Literal, State, Survey, Transition, UnaryOp, Variable,
    VersionRange,
};
use serde_json::{Map, Value};

use crate::error::InterchangeError;
use crate::MAX_EXPRESSION_DEPTH;

// ── Field helpers ───────────────────────────────────────────────────

fn as_object<'v>(
    value: &'v Value,
    entity: &str,
) -> Result<&'v Map<String, Value>, InterchangeError> {
    value.as_object().ok_or_else(|| InterchangeError::WrongType {
        entity: entity.to_string(),
        field: "<self>".to_string(),
        expected: "an object",
    })
}

fn required<'v>(
    obj: &'v Map<String, Value>,
    entity: &str,
    field: &str,
) -> Result<&'v Value, InterchangeError> {
    obj.get(field).ok_or_else(|| InterchangeError::MissingField {
        entity: entity.to_string(),
        field: field.to_string(),
    })
}

/// `None` for a missing or `null` field.
fn optional<'v>(obj: &'v Map<String, Value>, field: &str) -> Option<&'v Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn wrong_type(entity: &str, field: &str, expected: &'static str) -> InterchangeError {
    InterchangeError::WrongType {
        entity: entity.to_string(),
        field: field.to_string(),
        expected,
    }
}

fn required_str(
    obj: &Map<String, Value>,
    entity: &str,
    field: &str,
) -> Result<String, InterchangeError> {
    required(obj, entity, field)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(entity, field, "a string"))
}

fn optional_str(
    obj: &Map<String, Value>,
    entity: &str,
    field: &str,
) -> Result<Option<String>, InterchangeError> {
    optional(obj, field)
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| wrong_type(entity, field, "a string"))
        })
        .transpose()
}

fn string_list(
    obj: &Map<String, Value>,
    entity: &str,
    field: &str,
) -> Result<Vec<String>, InterchangeError> {
    let Some(value) = optional(obj, field) else {
        return Ok(Vec::new());
    };
    value
        .as_array()
        .ok_or_else(|| wrong_type(entity, field, "an array of strings"))?
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| wrong_type(entity, field, "an array of strings"))
        })
        .collect()
}

fn array<'v>(
    obj: &'v Map<String, Value>,
    entity: &str,
    field: &str,
) -> Result<&'v [Value], InterchangeError> {
    required(obj, entity, field)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| wrong_type(entity, field, "an array"))
}

fn optional_expression(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Option<Expression>, InterchangeError> {
    optional(obj, field).map(expression_from_value).transpose()
}

// ── Entities ────────────────────────────────────────────────────────

enum Pending<'v> {
    Visit(&'v Value, usize),
    Unary(UnaryOp),
    Binary(BinaryOp),
}

/// Decode an expression tree.
///
/// Trees nested deeper than [`MAX_EXPRESSION_DEPTH`] are rejected before
/// they are built. The walk keeps its own stack; children are decoded left
/// to right, so the first bad node in that order is the one reported.
pub fn expression_from_value(value: &Value) -> Result<Expression, InterchangeError> {
    let mut pending = vec![Pending::Visit(value, 1)];
    let mut built: Vec<Expression> = Vec::new();
    while let Some(item) = pending.pop() {
        match item {
            Pending::Visit(value, depth) => {
                if depth > MAX_EXPRESSION_DEPTH {
                    return Err(InterchangeError::DepthExceeded {
                        limit: MAX_EXPRESSION_DEPTH,
                    });
                }
                visit_expression(value, depth, &mut pending, &mut built)?;
            }
            Pending::Unary(op) => {
                let operand = take(&mut built);
                built.push(Expression::unary(op, operand));
            }
            Pending::Binary(op) => {
                let right = take(&mut built);
                let left = take(&mut built);
                built.push(Expression::binary(op, left, right));
            }
        }
    }
    Ok(take(&mut built))
}

/// Decode a leaf onto `built`, or schedule an operator and its operands.
fn visit_expression<'v>(
    value: &'v Value,
    depth: usize,
    pending: &mut Vec<Pending<'v>>,
    built: &mut Vec<Expression>,
) -> Result<(), InterchangeError> {
    let obj = as_object(value, "expression")?;
    let tag = required_str(obj, "expression", "type")?;
    match tag.as_str() {
        "lit" => {
            let value = required(obj, "lit expression", "value")?;
            built.push(Expression::Literal(literal_from_value(value)?));
        }
        "var" => {
            let name = required_str(obj, "var expression", "name")?;
            built.push(Expression::VariableRef(name));
        }
        "unary" => {
            let symbol = required_str(obj, "unary expression", "operator")?;
            let op = UnaryOp::from_symbol(&symbol).ok_or(InterchangeError::UnknownOperator {
                kind: "unary",
                symbol,
            })?;
            let operand = required(obj, "unary expression", "operand")?;
            pending.push(Pending::Unary(op));
            pending.push(Pending::Visit(operand, depth + 1));
        }
        "binary" => {
            let symbol = required_str(obj, "binary expression", "operator")?;
            let op = BinaryOp::from_symbol(&symbol).ok_or(InterchangeError::UnknownOperator {
                kind: "binary",
                symbol,
            })?;
            let left = required(obj, "binary expression", "left")?;
            let right = required(obj, "binary expression", "right")?;
            pending.push(Pending::Binary(op));
            pending.push(Pending::Visit(right, depth + 1));
            pending.push(Pending::Visit(left, depth + 1));
        }
        _ => return Err(InterchangeError::UnknownExpressionType { tag }),
    }
    Ok(())
}

// Operands are always built before the operator that consumes them.
fn take(built: &mut Vec<Expression>) -> Expression {
    built.pop().unwrap_or(Expression::Literal(Literal::Bool(false)))
}

/// JSON integers decode to `Int` and every other number to `Float`.
fn literal_from_value(value: &Value) -> Result<Literal, InterchangeError> {
    match value {
        Value::Bool(b) => Ok(Literal::Bool(*b)),
        Value::String(s) => Ok(Literal::Text(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Literal::Int(i))
            } else if n.is_f64() {
                n.as_f64()
                    .map(Literal::Float)
                    .ok_or_else(|| wrong_type("lit expression", "value", "a number"))
            } else {
                // u64 beyond i64::MAX
                Err(wrong_type("lit expression", "value", "a 64-bit signed integer"))
            }
        }
        _ => Err(wrong_type(
            "lit expression",
            "value",
            "a number, string or boolean",
        )),
    }
}

pub fn variable_from_value(value: &Value) -> Result<Variable, InterchangeError> {
    let obj = as_object(value, "variable")?;
    let name = required_str(obj, "variable", "name")?;
    let entity = format!("variable '{}'", name);
    Ok(Variable {
        description: optional_str(obj, &entity, "description")?,
        data_type: optional_str(obj, &entity, "data_type")?,
        name,
    })
}

pub fn version_range_from_value(value: &Value) -> Result<VersionRange, InterchangeError> {
    let obj = as_object(value, "version range")?;
    let apply_from = required(obj, "version range", "apply_from")?
        .as_i64()
        .ok_or_else(|| wrong_type("version range", "apply_from", "an integer"))?;
    let apply_to = optional(obj, "apply_to")
        .map(|v| {
            v.as_i64()
                .ok_or_else(|| wrong_type("version range", "apply_to", "an integer"))
        })
        .transpose()?;
    Ok(VersionRange {
        apply_from,
        apply_to,
    })
}

pub fn state_from_value(value: &Value) -> Result<State, InterchangeError> {
    let obj = as_object(value, "state")?;
    let id = required_str(obj, "state", "id")?;
    let entity = format!("state '{}'", id);
    Ok(State {
        text: required_str(obj, &entity, "text")?,
        entry_guard: optional_expression(obj, "entry_guard")?,
        validation: optional_expression(obj, "validation")?,
        version: optional(obj, "version")
            .map(version_range_from_value)
            .transpose()?,
        block: optional_str(obj, &entity, "block")?,
        id,
    })
}

pub fn transition_from_value(value: &Value) -> Result<Transition, InterchangeError> {
    let obj = as_object(value, "transition")?;
    Ok(Transition {
        from_state: required_str(obj, "transition", "from_state")?,
        to_state: required_str(obj, "transition", "to_state")?,
        guard: optional_expression(obj, "guard")?,
    })
}

/// `state_ids` is accepted as an older spelling of `state_templates`.
pub fn block_from_value(value: &Value) -> Result<Block, InterchangeError> {
    let obj = as_object(value, "block")?;
    let name = required_str(obj, "block", "name")?;
    let entity = format!("block '{}'", name);
    let templates_field = if obj.contains_key("state_templates") {
        "state_templates"
    } else {
        "state_ids"
    };
    Ok(Block {
        parameters: string_list(obj, &entity, "parameters")?,
        state_templates: string_list(obj, &entity, templates_field)?,
        name,
    })
}

/// Decode a whole survey. `blocks` and `metadata` may be omitted.
pub fn survey_from_value(value: &Value) -> Result<Survey, InterchangeError> {
    let obj = as_object(value, "survey")?;
    let name = required_str(obj, "survey", "name")?;

    let variables = array(obj, "survey", "variables")?
        .iter()
        .map(variable_from_value)
        .collect::<Result<Vec<_>, _>>()?;
    let states = array(obj, "survey", "states")?
        .iter()
        .map(state_from_value)
        .collect::<Result<Vec<_>, _>>()?;
    let transitions = array(obj, "survey", "transitions")?
        .iter()
        .map(transition_from_value)
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = Survey::builder(name)
        .variables(variables)
        .states(states)
        .transitions(transitions);

    if let Some(blocks) = optional(obj, "blocks") {
        let blocks = blocks
            .as_array()
            .ok_or_else(|| wrong_type("survey", "blocks", "an array"))?;
        for block in blocks {
            builder = builder.block(block_from_value(block)?);
        }
    }

    if let Some(metadata) = optional(obj, "metadata") {
        let metadata = metadata
            .as_object()
            .ok_or_else(|| wrong_type("survey", "metadata", "an object"))?;
        for (key, value) in metadata {
            let value = value
                .as_str()
                .ok_or_else(|| wrong_type("survey metadata", key, "a string"))?;
            builder = builder.metadata(key.clone(), value);
        }
    }

    let survey = builder.build();
    tracing::debug!(
        survey = survey.name(),
        states = survey.states().len(),
        transitions = survey.transitions().len(),
        "decoded survey"
    );
    Ok(survey)
}
