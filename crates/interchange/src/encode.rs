//! Encoding of model entities into interchange values.
//!
//! Every entity becomes a JSON object keyed by its model field names.
//! Absent optional fields are written as `null` so the shape of an object
//! never depends on its content.

use cslm_core::{Block, Expression, Literal, State, Survey, Transition, Variable, VersionRange};
use serde_json::{json, Map, Value};

use crate::error::InterchangeError;
use crate::MAX_EXPRESSION_DEPTH;

enum Step<'a> {
    Enter(&'a Expression),
    Exit(&'a Expression),
}

/// Encode an expression tree.
///
/// Trees deeper than [`MAX_EXPRESSION_DEPTH`] are rejected, so everything
/// this produces decodes again. The walk itself keeps its own stack.
pub fn expression_to_value(expr: &Expression) -> Result<Value, InterchangeError> {
    if expr.depth() > MAX_EXPRESSION_DEPTH {
        return Err(InterchangeError::DepthExceeded {
            limit: MAX_EXPRESSION_DEPTH,
        });
    }

    let mut steps = vec![Step::Enter(expr)];
    // Encoded children, left before right, waiting for their parent.
    let mut done: Vec<Value> = Vec::new();
    while let Some(step) = steps.pop() {
        match step {
            Step::Enter(node) => match node {
                Expression::Literal(lit) => {
                    done.push(json!({"type": "lit", "value": literal_to_value(lit)}));
                }
                Expression::VariableRef(name) => {
                    done.push(json!({"type": "var", "name": name}));
                }
                Expression::Unary { operand, .. } => {
                    steps.push(Step::Exit(node));
                    steps.push(Step::Enter(operand));
                }
                Expression::Binary { left, right, .. } => {
                    steps.push(Step::Exit(node));
                    steps.push(Step::Enter(right));
                    steps.push(Step::Enter(left));
                }
            },
            Step::Exit(node) => match node {
                Expression::Unary { op, .. } => {
                    let operand = done.pop().unwrap_or_default();
                    done.push(json!({
                        "type": "unary",
                        "operator": op.symbol(),
                        "operand": operand
                    }));
                }
                Expression::Binary { op, .. } => {
                    let right = done.pop().unwrap_or_default();
                    let left = done.pop().unwrap_or_default();
                    done.push(json!({
                        "type": "binary",
                        "operator": op.symbol(),
                        "left": left,
                        "right": right
                    }));
                }
                Expression::Literal(_) | Expression::VariableRef(_) => {}
            },
        }
    }
    Ok(done.pop().unwrap_or_default())
}

/// Non-finite floats have no JSON spelling and are written as `null`.
fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(n) => json!(n),
        Literal::Float(f) => json!(f),
        Literal::Text(s) => json!(s),
        Literal::Bool(b) => json!(b),
    }
}

fn optional_expression(expr: &Option<Expression>) -> Result<Value, InterchangeError> {
    expr.as_ref().map_or(Ok(Value::Null), expression_to_value)
}

pub fn variable_to_value(variable: &Variable) -> Value {
    json!({
        "name": variable.name,
        "description": variable.description,
        "data_type": variable.data_type
    })
}

pub fn version_range_to_value(range: &VersionRange) -> Value {
    json!({
        "apply_from": range.apply_from,
        "apply_to": range.apply_to
    })
}

pub fn state_to_value(state: &State) -> Result<Value, InterchangeError> {
    Ok(json!({
        "id": state.id,
        "text": state.text,
        "entry_guard": optional_expression(&state.entry_guard)?,
        "validation": optional_expression(&state.validation)?,
        "version": state.version.as_ref().map_or(Value::Null, version_range_to_value),
        "block": state.block
    }))
}

pub fn transition_to_value(transition: &Transition) -> Result<Value, InterchangeError> {
    Ok(json!({
        "from_state": transition.from_state,
        "to_state": transition.to_state,
        "guard": optional_expression(&transition.guard)?
    }))
}

pub fn block_to_value(block: &Block) -> Value {
    json!({
        "name": block.name,
        "parameters": block.parameters,
        "state_templates": block.state_templates
    })
}

pub fn survey_to_value(survey: &Survey) -> Result<Value, InterchangeError> {
    let metadata: Map<String, Value> = survey
        .metadata()
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    let states = survey
        .states()
        .iter()
        .map(state_to_value)
        .collect::<Result<Vec<_>, _>>()?;
    let transitions = survey
        .transitions()
        .iter()
        .map(transition_to_value)
        .collect::<Result<Vec<_>, _>>()?;

    let mut m = Map::new();
    m.insert("name".to_owned(), json!(survey.name()));
    m.insert(
        "variables".to_owned(),
        Value::Array(survey.variables().iter().map(variable_to_value).collect()),
    );
    m.insert("states".to_owned(), Value::Array(states));
    m.insert("transitions".to_owned(), Value::Array(transitions));
    m.insert(
        "blocks".to_owned(),
        Value::Array(survey.blocks().iter().map(block_to_value).collect()),
    );
    m.insert("metadata".to_owned(), Value::Object(metadata));
    Ok(Value::Object(m))
}
