//! S1 -- Variable usage inventory.
//!
//! Walks every expression in the survey and records, for each variable
//! name, the sites that reference it. Declared names that nothing
//! references are unused; referenced names with no declaration are
//! undefined.

use crate::structure::{expression_sites, ExpressionSite};
use cslm_core::Survey;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Usage of one variable name.
#[derive(Debug, Clone, Serialize)]
pub struct VariableUsage {
    pub name: String,
    pub declared: bool,
    /// Sites referencing the variable, in survey order.
    pub sites: Vec<ExpressionSite>,
    /// Number of referencing sites; a site mentioning a name twice counts once.
    pub usage_count: usize,
}

/// Aggregated S1 result.
#[derive(Debug, Clone, Serialize)]
pub struct S1Result {
    /// Every declared or referenced name.
    pub variables: BTreeMap<String, VariableUsage>,
    pub unused: BTreeSet<String>,
    pub undefined: BTreeSet<String>,
}

pub fn analyze_variables(survey: &Survey) -> S1Result {
    let mut variables: BTreeMap<String, VariableUsage> = BTreeMap::new();

    for v in survey.variables() {
        variables.insert(
            v.name.clone(),
            VariableUsage {
                name: v.name.clone(),
                declared: true,
                sites: Vec::new(),
                usage_count: 0,
            },
        );
    }

    for (site, expr) in expression_sites(survey) {
        for name in expr.variable_names() {
            let usage = variables
                .entry(name.to_string())
                .or_insert_with(|| VariableUsage {
                    name: name.to_string(),
                    declared: false,
                    sites: Vec::new(),
                    usage_count: 0,
                });
            usage.sites.push(site.clone());
            usage.usage_count += 1;
        }
    }

    let unused = variables
        .values()
        .filter(|u| u.declared && u.usage_count == 0)
        .map(|u| u.name.clone())
        .collect();
    let undefined = variables
        .values()
        .filter(|u| !u.declared)
        .map(|u| u.name.clone())
        .collect();

    S1Result {
        variables,
        unused,
        undefined,
    }
}
