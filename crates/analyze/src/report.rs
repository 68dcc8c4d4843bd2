//! SurveyReport -- aggregated output of the S1-S5 analyses.
//!
//! The report carries each analysis result that was run plus a flat,
//! deterministically ordered list of warnings derived from them.

use crate::s1_variables::S1Result;
use crate::s2_reachability::S2Result;
use crate::s3_cycles::S3Result;
use crate::s4_complexity::S4Result;
use crate::s5_coverage::S5Result;
use serde::Serialize;

/// Warning categories, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    UndefinedVariable,
    UnusedVariable,
    UnreachableState,
    NoIncomingTransition,
    CycleDetected,
    MissingValidation,
    MissingEntryGuard,
    ZeroVersionCoverage,
    HighExpressionComplexity,
}

/// A diagnostic about the survey. Warnings are data, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub category: WarningCategory,
    pub message: String,
    /// Offending state or variable, when there is one.
    pub subject_id: Option<String>,
}

impl Warning {
    fn about(category: WarningCategory, subject: &str, message: String) -> Self {
        Warning {
            category,
            message,
            subject_id: Some(subject.to_string()),
        }
    }
}

/// Aggregated analysis report.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyReport {
    pub survey_name: String,
    pub total_states: usize,
    pub total_transitions: usize,
    pub total_variables: usize,
    pub total_blocks: usize,
    pub s1_variables: Option<S1Result>,
    pub s2_reachability: Option<S2Result>,
    pub s3_cycles: Option<S3Result>,
    pub s4_complexity: Option<S4Result>,
    pub s5_coverage: Option<S5Result>,
    pub analyses_run: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl SurveyReport {
    /// Create an empty report for a survey.
    pub fn new(survey_name: impl Into<String>) -> Self {
        SurveyReport {
            survey_name: survey_name.into(),
            total_states: 0,
            total_transitions: 0,
            total_variables: 0,
            total_blocks: 0,
            s1_variables: None,
            s2_reachability: None,
            s3_cycles: None,
            s4_complexity: None,
            s5_coverage: None,
            analyses_run: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Render the report as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Warnings of one category, in report order.
    pub fn warnings_of(&self, category: WarningCategory) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.category == category)
    }

    /// Derive warnings from the populated results, replacing any previous ones.
    pub fn extract_warnings(&mut self) {
        self.warnings.clear();

        if let Some(ref s1) = self.s1_variables {
            for name in &s1.undefined {
                let sites = s1.variables.get(name).map_or(0, |u| u.usage_count);
                self.warnings.push(Warning::about(
                    WarningCategory::UndefinedVariable,
                    name,
                    format!(
                        "variable '{}' is referenced in {} expression(s) but never declared",
                        name, sites
                    ),
                ));
            }
            for name in &s1.unused {
                self.warnings.push(Warning::about(
                    WarningCategory::UnusedVariable,
                    name,
                    format!("variable '{}' is declared but never referenced", name),
                ));
            }
        }

        if let Some(ref s2) = self.s2_reachability {
            for id in &s2.unreachable {
                self.warnings.push(Warning::about(
                    WarningCategory::UnreachableState,
                    id,
                    format!("state '{}' is not reachable from START", id),
                ));
            }
            for id in &s2.no_incoming {
                self.warnings.push(Warning::about(
                    WarningCategory::NoIncomingTransition,
                    id,
                    format!("state '{}' has no incoming transition", id),
                ));
            }
        }

        if let Some(ref s3) = self.s3_cycles {
            for cycle in &s3.cycles {
                if let Some(first) = cycle.first() {
                    self.warnings.push(Warning::about(
                        WarningCategory::CycleDetected,
                        first,
                        format!("cycle detected: {} -> {}", cycle.join(" -> "), first),
                    ));
                }
            }
        }

        if let Some(ref s5) = self.s5_coverage {
            for id in &s5.missing_validation {
                self.warnings.push(Warning::about(
                    WarningCategory::MissingValidation,
                    id,
                    format!("state '{}' has no validation rule", id),
                ));
            }
            for id in &s5.missing_entry_guard {
                self.warnings.push(Warning::about(
                    WarningCategory::MissingEntryGuard,
                    id,
                    format!("state '{}' has no entry guard", id),
                ));
            }
            if s5.total_states > 0 && s5.with_version == 0 {
                self.warnings.push(Warning {
                    category: WarningCategory::ZeroVersionCoverage,
                    message: format!(
                        "none of the {} states carry a version range",
                        s5.total_states
                    ),
                    subject_id: None,
                });
            }
        }

        if let Some(ref s4) = self.s4_complexity {
            for e in s4.expressions.iter().filter(|e| e.high) {
                self.warnings.push(Warning::about(
                    WarningCategory::HighExpressionComplexity,
                    e.site.subject_id(),
                    format!(
                        "{} is {:?} ({} nodes, depth {})",
                        e.site, e.class, e.node_count, e.depth
                    ),
                ));
            }
        }

        // Sort warnings for deterministic output
        self.warnings.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.subject_id.cmp(&b.subject_id))
                .then_with(|| a.message.cmp(&b.message))
        });
    }
}
