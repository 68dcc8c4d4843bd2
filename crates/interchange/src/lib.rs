//! cslm-interchange: lossless tree-shaped encoding of the survey model.
//!
//! Every model entity maps to a `serde_json::Value` object keyed by its
//! field names, and back. Expressions are tagged by a `type` field
//! (`binary`, `unary`, `var`, `lit`) and carry operators in their
//! canonical spelling, so the format is independent of any input syntax.
//!
//! Decoding an encoded survey yields an equal survey. The format is
//! documented by `schema/survey-schema.json` at the repository root.
//! Expression trees are carried up to [`MAX_EXPRESSION_DEPTH`] levels deep
//! in both directions.

pub mod decode;
pub mod encode;
pub mod error;

pub use decode::{
    block_from_value, expression_from_value, state_from_value, survey_from_value,
    transition_from_value, variable_from_value, version_range_from_value,
};
pub use encode::{
    block_to_value, expression_to_value, state_to_value, survey_to_value, transition_to_value,
    variable_to_value, version_range_to_value,
};
pub use error::InterchangeError;

use cslm_core::Survey;

/// Deepest expression tree, counting a leaf as one level, that is encoded
/// or decoded.
pub const MAX_EXPRESSION_DEPTH: usize = 1024;

/// Encode a survey as indented JSON text.
pub fn to_json_string(survey: &Survey) -> Result<String, InterchangeError> {
    // Value's Display cannot fail; the alternate form indents.
    Ok(format!("{:#}", survey_to_value(survey)?))
}

/// Decode a survey from JSON text.
///
/// Nesting is bounded by `serde_json`'s parser limit, so expressions nested
/// much beyond 100 levels must be decoded from a `Value` built another way.
pub fn from_json_str(src: &str) -> Result<Survey, InterchangeError> {
    let value: serde_json::Value =
        serde_json::from_str(src).map_err(|e| InterchangeError::Json(e.to_string()))?;
    survey_from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cslm_core::{Expression, State, Transition, START};

    #[test]
    fn test_text_round_trip() {
        let survey = Survey::builder("S")
            .state(
                State::new("Q1", "First")
                    .with_validation(Expression::ge(Expression::var("Q1"), Expression::float(0.5))),
            )
            .transition(Transition::new(START, "Q1"))
            .build();
        let text = to_json_string(&survey).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(from_json_str(&text).unwrap(), survey);
    }

    #[test]
    fn test_invalid_json_text() {
        assert!(matches!(
            from_json_str("{not json"),
            Err(InterchangeError::Json(_))
        ));
    }

    #[test]
    fn test_non_object_root() {
        assert!(matches!(
            from_json_str("[]"),
            Err(InterchangeError::WrongType { .. })
        ));
    }
}
