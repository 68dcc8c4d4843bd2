//! Survey analyzer -- S1-S5 diagnostics over a completed survey.
//!
//! The analyzer is a pure function of a [`Survey`]: it checks structural
//! invariants first (see [`structure`]) and then runs each analysis as a
//! separate module producing a serializable result struct. The results and
//! the warnings derived from them are aggregated into a [`SurveyReport`].
//!
//! Diagnostics are data: unreachable states, undefined variables and cycles
//! become warnings. Only a structurally invalid survey is an error.

pub mod config;
pub mod report;
pub mod s1_variables;
pub mod s2_reachability;
pub mod s3_cycles;
pub mod s4_complexity;
pub mod s5_coverage;
pub mod structure;

pub use config::AnalyzerConfig;
pub use report::{SurveyReport, Warning, WarningCategory};
pub use s1_variables::{S1Result, VariableUsage};
pub use s2_reachability::S2Result;
pub use s3_cycles::S3Result;
pub use s4_complexity::{ComplexityClass, ExpressionComplexity, S4Result};
pub use s5_coverage::S5Result;
pub use structure::{check_structure, ExpressionSite, StructuralError};

use cslm_core::Survey;

/// One of the five analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Analysis {
    Variables,
    Reachability,
    Cycles,
    Complexity,
    Coverage,
}

impl Analysis {
    pub const ALL: [Analysis; 5] = [
        Analysis::Variables,
        Analysis::Reachability,
        Analysis::Cycles,
        Analysis::Complexity,
        Analysis::Coverage,
    ];

    /// Short name recorded in [`SurveyReport::analyses_run`].
    pub fn id(&self) -> &'static str {
        match self {
            Analysis::Variables => "s1",
            Analysis::Reachability => "s2",
            Analysis::Cycles => "s3",
            Analysis::Complexity => "s4",
            Analysis::Coverage => "s5",
        }
    }

    pub fn from_id(id: &str) -> Option<Analysis> {
        Analysis::ALL.into_iter().find(|a| a.id() == id)
    }
}

/// Run the full S1-S5 suite with default thresholds.
pub fn analyze(survey: &Survey) -> Result<SurveyReport, StructuralError> {
    analyze_with(survey, &AnalyzerConfig::default())
}

/// Run the full S1-S5 suite.
pub fn analyze_with(
    survey: &Survey,
    config: &AnalyzerConfig,
) -> Result<SurveyReport, StructuralError> {
    analyze_selected(survey, &Analysis::ALL, config)
}

/// Run only the requested analyses, in S1-S5 order.
///
/// The analyses are independent of one another, so nothing beyond the
/// selection is run. Duplicates in `analyses` are ignored.
pub fn analyze_selected(
    survey: &Survey,
    analyses: &[Analysis],
    config: &AnalyzerConfig,
) -> Result<SurveyReport, StructuralError> {
    if let Err(e) = check_structure(survey) {
        tracing::warn!(survey = survey.name(), error = %e, "structural check failed");
        return Err(e);
    }

    let needed = |a: Analysis| analyses.contains(&a);

    let mut report = SurveyReport::new(survey.name());
    report.total_states = survey.states().len();
    report.total_transitions = survey.transitions().len();
    report.total_variables = survey.variables().len();
    report.total_blocks = survey.blocks().len();

    if needed(Analysis::Variables) {
        report.s1_variables = Some(s1_variables::analyze_variables(survey));
        report.analyses_run.push(Analysis::Variables.id().to_string());
    }
    if needed(Analysis::Reachability) {
        report.s2_reachability = Some(s2_reachability::analyze_reachability(survey));
        report.analyses_run.push(Analysis::Reachability.id().to_string());
    }
    if needed(Analysis::Cycles) {
        report.s3_cycles = Some(s3_cycles::analyze_cycles(survey));
        report.analyses_run.push(Analysis::Cycles.id().to_string());
    }
    if needed(Analysis::Complexity) {
        report.s4_complexity = Some(s4_complexity::analyze_complexity(survey, config));
        report.analyses_run.push(Analysis::Complexity.id().to_string());
    }
    if needed(Analysis::Coverage) {
        report.s5_coverage = Some(s5_coverage::analyze_coverage(survey));
        report.analyses_run.push(Analysis::Coverage.id().to_string());
    }

    report.extract_warnings();

    tracing::debug!(
        survey = survey.name(),
        analyses = ?report.analyses_run,
        warnings = report.warnings.len(),
        "analysis complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cslm_core::{Expression, State, Transition, Variable, START};

    fn make_test_survey() -> Survey {
        Survey::builder("Test")
            .variable(Variable::new("X"))
            .variable(Variable::new("Y"))
            .state(State::new("X", "First"))
            .state(
                State::new("Y", "Second")
                    .with_entry_guard(Expression::eq(Expression::var("X"), Expression::int(1))),
            )
            .transition(Transition::new(START, "X"))
            .transition(Transition::guarded(
                "X",
                "Y",
                Expression::eq(Expression::var("X"), Expression::int(1)),
            ))
            .build()
    }

    #[test]
    fn test_full_analyze() {
        let report = analyze(&make_test_survey()).unwrap();

        assert!(report.s1_variables.is_some());
        assert!(report.s2_reachability.is_some());
        assert!(report.s3_cycles.is_some());
        assert!(report.s4_complexity.is_some());
        assert!(report.s5_coverage.is_some());
        assert_eq!(report.analyses_run, vec!["s1", "s2", "s3", "s4", "s5"]);
        assert_eq!(report.total_states, 2);
        assert_eq!(report.total_transitions, 2);
        assert_eq!(report.total_variables, 2);
        assert_eq!(report.total_blocks, 0);
    }

    #[test]
    fn test_analyze_selected_s2_only() {
        let config = AnalyzerConfig::default();
        let report =
            analyze_selected(&make_test_survey(), &[Analysis::Reachability], &config).unwrap();

        assert!(report.s1_variables.is_none());
        assert!(report.s2_reachability.is_some());
        assert!(report.s5_coverage.is_none());
        assert_eq!(report.analyses_run, vec!["s2"]);
    }

    #[test]
    fn test_analyze_selected_runs_in_fixed_order() {
        let report = analyze_selected(
            &make_test_survey(),
            &[Analysis::Coverage, Analysis::Variables, Analysis::Coverage],
            &AnalyzerConfig::default(),
        )
        .unwrap();
        assert_eq!(report.analyses_run, vec!["s1", "s5"]);
    }

    #[test]
    fn test_structural_error_stops_analysis() {
        let survey = make_test_survey()
            .to_builder()
            .transition(Transition::new("Y", "Nowhere"))
            .build();
        assert!(matches!(
            analyze(&survey),
            Err(StructuralError::DanglingTransition { .. })
        ));
    }

    #[test]
    fn test_analysis_ids() {
        for a in Analysis::ALL {
            assert_eq!(Analysis::from_id(a.id()), Some(a));
        }
        assert_eq!(Analysis::from_id("s8"), None);
    }

    #[test]
    fn test_analyze_report_serializable() {
        let report = analyze(&make_test_survey()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.is_object());
        assert!(json.get("analyses_run").unwrap().is_array());
        assert!(json.get("warnings").unwrap().is_array());
    }

    #[test]
    fn test_analyze_does_not_mutate() {
        let survey = make_test_survey();
        let before = survey.clone();
        let _ = analyze(&survey).unwrap();
        assert_eq!(survey, before);
    }
}
