//! S2 -- Reachability from START.
//!
//! Depth-first traversal from the `START` sentinel over every transition.
//! Guards are not evaluated: an edge is followed whether or not it is
//! guarded, so this is a property of graph shape only.

use crate::structure::Graph;
use cslm_core::{Survey, START};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Aggregated S2 result.
#[derive(Debug, Clone, Serialize)]
pub struct S2Result {
    pub reachable: BTreeSet<String>,
    pub unreachable: BTreeSet<String>,
    /// Direct targets of `START`, in transition order.
    pub entry_points: Vec<String>,
    /// States with no outgoing transition, in survey order.
    pub exit_points: Vec<String>,
    /// States with no incoming transition at all, in survey order.
    pub no_incoming: Vec<String>,
}

pub fn analyze_reachability(survey: &Survey) -> S2Result {
    let graph = Graph::new(survey);

    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![START];
    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        for &next in graph.successors(node).iter().rev() {
            if !visited.contains(next) {
                stack.push(next);
            }
        }
    }

    let mut reachable = BTreeSet::new();
    let mut unreachable = BTreeSet::new();
    for state in survey.states() {
        if visited.contains(state.id.as_str()) {
            reachable.insert(state.id.clone());
        } else {
            unreachable.insert(state.id.clone());
        }
    }

    let mut entry_points: Vec<String> = Vec::new();
    for &target in graph.successors(START) {
        if survey.state(target).is_some() && !entry_points.iter().any(|e| e == target) {
            entry_points.push(target.to_string());
        }
    }

    let exit_points = survey
        .states()
        .iter()
        .filter(|s| graph.out_degree(&s.id) == 0)
        .map(|s| s.id.clone())
        .collect();

    let no_incoming = survey
        .states()
        .iter()
        .filter(|s| !graph.has_incoming(&s.id))
        .map(|s| s.id.clone())
        .collect();

    S2Result {
        reachable,
        unreachable,
        entry_points,
        exit_points,
        no_incoming,
    }
}
