//! Integration tests for the S1-S5 analysis suite.
//!
//! Surveys are built either programmatically or through the tabular parser,
//! then run through the full pipeline and checked against known results.

use cslm_analyze::{
    analyze, analyze_with, AnalyzerConfig, ComplexityClass, StructuralError, SurveyReport,
    WarningCategory,
};
use cslm_core::{
    parse_table, Expression, State, Survey, Table, Transition, Variable, VersionRange, END, START,
};
use std::collections::BTreeSet;

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn subjects(report: &SurveyReport, category: WarningCategory) -> Vec<String> {
    report
        .warnings_of(category)
        .filter_map(|w| w.subject_id.clone())
        .collect()
}

fn employment_table() -> Table {
    Table::new(["variable", "question", "route", "valid_response", "apply_from"])
        .with_row(["Wrking", "Did you do any paid work?", "", "Wrking == 1 | Wrking == 2", "2204"])
        .with_row(["NumJob", "How many jobs?", "Wrking == 1", "NumJob >= 1 & NumJob <= 4", "2204"])
        .with_row(["BType1", "Business type, job 1", "NumJob >= 1", "", "2204"])
        .with_row(["BType2", "Business type, job 2", "NumJob >= 2", "", "2204"])
        .with_row(["Retired", "Are you retired?", "Age >= 65", "Retired == 1 | Retired == 2", ""])
}

fn analyze_fixture() -> SurveyReport {
    let survey = parse_table(&employment_table(), "Employment").unwrap();
    analyze(&survey).unwrap_or_else(|e| panic!("analysis failed: {}", e))
}

// ──────────────────────────────────────────────
// Graph properties
// ──────────────────────────────────────────────

#[test]
fn test_reachability_with_disconnected_state() {
    let survey = Survey::builder("S")
        .state(State::new("X", "x"))
        .state(State::new("Y", "y"))
        .state(State::new("Z", "z"))
        .transition(Transition::new(START, "X"))
        .transition(Transition::new("X", "Y"))
        .build();
    let report = analyze(&survey).unwrap();
    let s2 = report.s2_reachability.as_ref().expect("S2 should be populated");

    assert_eq!(s2.reachable, set(&["X", "Y"]));
    assert_eq!(s2.unreachable, set(&["Z"]));
    assert_eq!(subjects(&report, WarningCategory::UnreachableState), vec!["Z"]);
    assert_eq!(subjects(&report, WarningCategory::NoIncomingTransition), vec!["Z"]);
}

#[test]
fn test_single_cycle_reported_once() {
    let survey = Survey::builder("S")
        .state(State::new("X", "x"))
        .state(State::new("Y", "y"))
        .transition(Transition::new(START, "X"))
        .transition(Transition::new("X", "Y"))
        .transition(Transition::new("Y", "X"))
        .transition(Transition::new("Y", END))
        .build();
    let report = analyze(&survey).unwrap();
    let s3 = report.s3_cycles.as_ref().expect("S3 should be populated");

    assert_eq!(s3.cycles, vec![vec!["X".to_string(), "Y".to_string()]]);
    let cycle_warnings: Vec<_> = report.warnings_of(WarningCategory::CycleDetected).collect();
    assert_eq!(cycle_warnings.len(), 1);
    assert_eq!(cycle_warnings[0].message, "cycle detected: X -> Y -> X");
}

// ──────────────────────────────────────────────
// Variable inventory
// ──────────────────────────────────────────────

#[test]
fn test_unused_and_undefined_variables() {
    let survey = Survey::builder("S")
        .variable(Variable::new("V"))
        .state(
            State::new("Q1", "q1")
                .with_entry_guard(Expression::eq(Expression::var("W"), Expression::int(1))),
        )
        .transition(Transition::new(START, "Q1"))
        .build();
    let report = analyze(&survey).expect("undefined variables are warnings, not errors");
    let s1 = report.s1_variables.as_ref().unwrap();

    assert_eq!(s1.unused, set(&["V"]));
    assert_eq!(s1.undefined, set(&["W"]));
    assert_eq!(subjects(&report, WarningCategory::UnusedVariable), vec!["V"]);
    assert_eq!(subjects(&report, WarningCategory::UndefinedVariable), vec!["W"]);
}

// ──────────────────────────────────────────────
// Tabular fixture end to end
// ──────────────────────────────────────────────

#[test]
fn test_fixture_inventory() {
    let report = analyze_fixture();
    assert_eq!(report.survey_name, "Employment");
    assert_eq!(report.total_states, 5);
    assert_eq!(report.total_variables, 5);

    let s1 = report.s1_variables.as_ref().unwrap();
    // Age is only referenced; BType1/BType2 are only declared.
    assert_eq!(s1.undefined, set(&["Age"]));
    assert_eq!(s1.unused, set(&["BType1", "BType2"]));
    // NumJob: own validation, two entry guards, two inferred edges.
    assert_eq!(s1.variables["NumJob"].usage_count, 5);
}

#[test]
fn test_fixture_graph() {
    let report = analyze_fixture();
    let s2 = report.s2_reachability.as_ref().unwrap();

    assert!(s2.unreachable.is_empty());
    assert_eq!(s2.entry_points, vec!["Wrking", "Retired"]);
    assert_eq!(s2.exit_points, vec!["BType1", "BType2", "Retired"]);
    assert!(!report.s3_cycles.as_ref().unwrap().has_cycles);
}

#[test]
fn test_fixture_coverage() {
    let report = analyze_fixture();
    let s5 = report.s5_coverage.as_ref().unwrap();

    assert_eq!(s5.with_entry_guard, 4);
    assert_eq!(s5.with_validation, 3);
    assert_eq!(s5.with_version, 4);
    assert_eq!(s5.validation_fraction, 0.6);
    assert_eq!(s5.max_outgoing, 2);
    assert_eq!(
        subjects(&report, WarningCategory::MissingValidation),
        vec!["BType1", "BType2"]
    );
    // Every guard-less state is a direct START target.
    assert!(subjects(&report, WarningCategory::MissingEntryGuard).is_empty());
    assert_eq!(report.warnings_of(WarningCategory::ZeroVersionCoverage).count(), 0);
}

#[test]
fn test_fixture_warning_order() {
    let report = analyze_fixture();
    let categories: Vec<WarningCategory> = report.warnings.iter().map(|w| w.category).collect();
    let mut sorted = categories.clone();
    sorted.sort();
    assert_eq!(categories, sorted);
    assert_eq!(categories.first(), Some(&WarningCategory::UndefinedVariable));
}

#[test]
fn test_analysis_is_deterministic() {
    let a = serde_json::to_value(analyze_fixture()).unwrap();
    let b = serde_json::to_value(analyze_fixture()).unwrap();
    assert_eq!(a, b);
}

// ──────────────────────────────────────────────
// Coverage and complexity warnings
// ──────────────────────────────────────────────

#[test]
fn test_missing_guard_and_zero_versions() {
    let survey = Survey::builder("S")
        .state(State::new("Q1", "first"))
        .state(State::new("Q2", "second"))
        .transition(Transition::new(START, "Q1"))
        .transition(Transition::new("Q1", "Q2"))
        .build();
    let report = analyze(&survey).unwrap();

    assert_eq!(subjects(&report, WarningCategory::MissingEntryGuard), vec!["Q2"]);
    let zero: Vec<_> = report.warnings_of(WarningCategory::ZeroVersionCoverage).collect();
    assert_eq!(zero.len(), 1);
    assert_eq!(zero[0].subject_id, None);
}

#[test]
fn test_versions_silence_zero_coverage() {
    let survey = Survey::builder("S")
        .state(State::new("Q1", "first").with_version(VersionRange::starting(1)))
        .state(State::new("Q2", "second"))
        .transition(Transition::new(START, "Q1"))
        .build();
    let report = analyze(&survey).unwrap();
    assert_eq!(report.warnings_of(WarningCategory::ZeroVersionCoverage).count(), 0);
}

#[test]
fn test_complexity_thresholds_from_config() {
    let mut guard = Expression::eq(Expression::var("A"), Expression::int(0));
    for i in 1..3 {
        guard = Expression::or(guard, Expression::eq(Expression::var("A"), Expression::int(i)));
    }
    // 11 nodes, depth 4
    let survey = Survey::builder("S")
        .variable(Variable::new("A"))
        .state(State::new("A", "a"))
        .state(State::new("Q", "q").with_entry_guard(guard))
        .transition(Transition::new(START, "A"))
        .transition(Transition::new("A", "Q"))
        .build();

    let report = analyze(&survey).unwrap();
    let s4 = report.s4_complexity.as_ref().unwrap();
    assert_eq!(s4.expressions[0].class, ComplexityClass::Moderate);
    assert_eq!(report.warnings_of(WarningCategory::HighExpressionComplexity).count(), 0);

    let strict = AnalyzerConfig::from_toml_str("moderate_max_nodes = 10").unwrap();
    let report = analyze_with(&survey, &strict).unwrap();
    assert_eq!(
        subjects(&report, WarningCategory::HighExpressionComplexity),
        vec!["Q"]
    );

    let shallow = AnalyzerConfig::from_toml_str("deep_expression_depth = 3").unwrap();
    let report = analyze_with(&survey, &shallow).unwrap();
    assert_eq!(report.warnings_of(WarningCategory::HighExpressionComplexity).count(), 1);
}

// ──────────────────────────────────────────────
// Structural errors
// ──────────────────────────────────────────────

#[test]
fn test_duplicate_state_is_structural_error() {
    let survey = Survey::builder("S")
        .state(State::new("Q1", "a"))
        .state(State::new("Q1", "b"))
        .build();
    assert_eq!(
        analyze(&survey).unwrap_err(),
        StructuralError::DuplicateState { id: "Q1".into() }
    );
}

#[test]
fn test_dangling_endpoint_is_structural_error() {
    let survey = Survey::builder("S")
        .state(State::new("Q1", "a"))
        .transition(Transition::new(START, "Q1"))
        .transition(Transition::new("Q1", "Q9"))
        .build();
    let err = analyze(&survey).unwrap_err();
    assert_eq!(
        err.to_string(),
        "transition #1 (Q1 -> Q9) has unresolved endpoint 'Q9'"
    );
}
