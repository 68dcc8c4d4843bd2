//! S5 -- Coverage metrics.
//!
//! How much of the survey carries entry guards, validation and version
//! metadata, and how many transitions leave each state.

use crate::structure::Graph;
use cslm_core::{Survey, START};
use serde::Serialize;

/// Aggregated S5 result. Fractions are 0.0 for a survey without states.
#[derive(Debug, Clone, Serialize)]
pub struct S5Result {
    pub total_states: usize,
    pub with_entry_guard: usize,
    pub with_validation: usize,
    pub with_version: usize,
    pub entry_guard_fraction: f64,
    pub validation_fraction: f64,
    pub version_fraction: f64,
    /// Outgoing transitions per state, `START` excluded.
    pub mean_outgoing: f64,
    pub max_outgoing: usize,
    /// States without validation, in survey order.
    pub missing_validation: Vec<String>,
    /// States without an entry guard that are not direct `START` targets.
    pub missing_entry_guard: Vec<String>,
}

pub fn analyze_coverage(survey: &Survey) -> S5Result {
    let graph = Graph::new(survey);
    let states = survey.states();
    let total_states = states.len();

    let with_entry_guard = states.iter().filter(|s| s.entry_guard.is_some()).count();
    let with_validation = states.iter().filter(|s| s.validation.is_some()).count();
    let with_version = states.iter().filter(|s| s.version.is_some()).count();

    let outgoing: Vec<usize> = states.iter().map(|s| graph.out_degree(&s.id)).collect();
    let max_outgoing = outgoing.iter().copied().max().unwrap_or(0);

    let start_targets = graph.successors(START);
    let missing_validation = states
        .iter()
        .filter(|s| s.validation.is_none())
        .map(|s| s.id.clone())
        .collect();
    let missing_entry_guard = states
        .iter()
        .filter(|s| s.entry_guard.is_none() && !start_targets.contains(&s.id.as_str()))
        .map(|s| s.id.clone())
        .collect();

    S5Result {
        total_states,
        with_entry_guard,
        with_validation,
        with_version,
        entry_guard_fraction: fraction(with_entry_guard, total_states),
        validation_fraction: fraction(with_validation, total_states),
        version_fraction: fraction(with_version, total_states),
        mean_outgoing: fraction(outgoing.iter().sum(), total_states),
        max_outgoing,
        missing_validation,
        missing_entry_guard,
    }
}

fn fraction(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cslm_core::{Expression, State, Transition, VersionRange, END};

    fn guard() -> Expression {
        Expression::eq(Expression::var("X"), Expression::int(1))
    }

    #[test]
    fn test_fractions_and_fanout() {
        let survey = Survey::builder("S")
            .state(
                State::new("X", "x")
                    .with_validation(guard())
                    .with_version(VersionRange::starting(2204)),
            )
            .state(State::new("Y", "y").with_entry_guard(guard()))
            .state(State::new("Z", "z"))
            .state(State::new("W", "w").with_validation(guard()))
            .transition(Transition::new(START, "X"))
            .transition(Transition::guarded("X", "Y", guard()))
            .transition(Transition::new("X", "Z"))
            .transition(Transition::new("X", "W"))
            .transition(Transition::new("Y", END))
            .build();
        let result = analyze_coverage(&survey);

        assert_eq!(result.total_states, 4);
        assert_eq!(result.entry_guard_fraction, 0.25);
        assert_eq!(result.validation_fraction, 0.5);
        assert_eq!(result.version_fraction, 0.25);
        assert_eq!(result.max_outgoing, 3);
        assert_eq!(result.mean_outgoing, 1.0);
        assert_eq!(result.missing_validation, vec!["Y", "Z"]);
        // X is a first question and legitimately unguarded.
        assert_eq!(result.missing_entry_guard, vec!["Z", "W"]);
    }

    #[test]
    fn test_empty_survey() {
        let result = analyze_coverage(&Survey::builder("Empty").build());
        assert_eq!(result.total_states, 0);
        assert_eq!(result.entry_guard_fraction, 0.0);
        assert_eq!(result.mean_outgoing, 0.0);
        assert_eq!(result.max_outgoing, 0);
    }
}
