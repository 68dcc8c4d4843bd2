//! Structural invariants and shared graph views.
//!
//! Every analysis assumes unique ids and resolvable transition endpoints.
//! [`check_structure`] enforces that up front so the analyses themselves
//! never have to cope with a malformed survey.

use std::collections::{HashMap, HashSet};
use std::fmt;

use cslm_core::{is_sentinel, Expression, Survey, END, START};
use serde::Serialize;
use thiserror::Error;

/// A survey that violates the model's basic invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("duplicate state id '{id}'")]
    DuplicateState { id: String },

    #[error("duplicate variable name '{name}'")]
    DuplicateVariable { name: String },

    #[error("duplicate block name '{name}'")]
    DuplicateBlock { name: String },

    /// A state is named like one of the `START`/`END` sentinels.
    #[error("state id '{id}' is reserved for a sentinel")]
    ReservedStateId { id: String },

    /// Transition `index` names an endpoint that is neither a state nor a
    /// sentinel usable in that position.
    #[error("transition #{index} ({from_state} -> {to_state}) has unresolved endpoint '{endpoint}'")]
    DanglingTransition {
        index: usize,
        from_state: String,
        to_state: String,
        endpoint: String,
    },
}

/// Check ids and transition endpoints.
///
/// `START` may only appear as a source and `END` only as a target.
pub fn check_structure(survey: &Survey) -> Result<(), StructuralError> {
    let mut state_ids: HashSet<&str> = HashSet::new();
    for state in survey.states() {
        if is_sentinel(&state.id) {
            return Err(StructuralError::ReservedStateId {
                id: state.id.clone(),
            });
        }
        if !state_ids.insert(state.id.as_str()) {
            return Err(StructuralError::DuplicateState {
                id: state.id.clone(),
            });
        }
    }

    let mut names: HashSet<&str> = HashSet::new();
    for variable in survey.variables() {
        if !names.insert(variable.name.as_str()) {
            return Err(StructuralError::DuplicateVariable {
                name: variable.name.clone(),
            });
        }
    }

    let mut blocks: HashSet<&str> = HashSet::new();
    for block in survey.blocks() {
        if !blocks.insert(block.name.as_str()) {
            return Err(StructuralError::DuplicateBlock {
                name: block.name.clone(),
            });
        }
    }

    for (index, t) in survey.transitions().iter().enumerate() {
        let from_ok = t.from_state == START || state_ids.contains(t.from_state.as_str());
        let to_ok = t.to_state == END || state_ids.contains(t.to_state.as_str());
        if !from_ok || !to_ok {
            let endpoint = if from_ok { &t.to_state } else { &t.from_state };
            return Err(StructuralError::DanglingTransition {
                index,
                from_state: t.from_state.clone(),
                to_state: t.to_state.clone(),
                endpoint: endpoint.clone(),
            });
        }
    }

    Ok(())
}

// ──────────────────────────────────────────────
// Graph
// ──────────────────────────────────────────────

/// Adjacency lists over state ids and sentinels, in transition order.
pub(crate) struct Graph<'a> {
    pub outgoing: HashMap<&'a str, Vec<&'a str>>,
    pub incoming: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Graph<'a> {
    pub fn new(survey: &'a Survey) -> Self {
        let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
        for t in survey.transitions() {
            outgoing
                .entry(t.from_state.as_str())
                .or_default()
                .push(t.to_state.as_str());
            incoming
                .entry(t.to_state.as_str())
                .or_default()
                .push(t.from_state.as_str());
        }
        Graph { outgoing, incoming }
    }

    pub fn successors(&self, id: &str) -> &[&'a str] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.successors(id).len()
    }

    pub fn has_incoming(&self, id: &str) -> bool {
        self.incoming.contains_key(id)
    }
}

// ──────────────────────────────────────────────
// Expression sites
// ──────────────────────────────────────────────

/// Where an expression is attached in a survey.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpressionSite {
    EntryGuard {
        state: String,
    },
    Validation {
        state: String,
    },
    TransitionGuard {
        index: usize,
        from_state: String,
        to_state: String,
    },
}

impl ExpressionSite {
    /// The state a diagnostic about this site is filed under. Transition
    /// guards are filed under their target.
    pub fn subject_id(&self) -> &str {
        match self {
            ExpressionSite::EntryGuard { state } | ExpressionSite::Validation { state } => state,
            ExpressionSite::TransitionGuard { to_state, .. } => to_state,
        }
    }
}

impl fmt::Display for ExpressionSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionSite::EntryGuard { state } => write!(f, "entry guard of '{}'", state),
            ExpressionSite::Validation { state } => write!(f, "validation of '{}'", state),
            ExpressionSite::TransitionGuard {
                index,
                from_state,
                to_state,
            } => write!(
                f,
                "guard of transition #{} ({} -> {})",
                index, from_state, to_state
            ),
        }
    }
}

/// Every expression in the survey with its site: per state the entry
/// guard then the validation, followed by transition guards.
pub(crate) fn expression_sites(survey: &Survey) -> Vec<(ExpressionSite, &Expression)> {
    let mut sites = Vec::new();
    for state in survey.states() {
        if let Some(guard) = &state.entry_guard {
            sites.push((
                ExpressionSite::EntryGuard {
                    state: state.id.clone(),
                },
                guard,
            ));
        }
        if let Some(validation) = &state.validation {
            sites.push((
                ExpressionSite::Validation {
                    state: state.id.clone(),
                },
                validation,
            ));
        }
    }
    for (index, t) in survey.transitions().iter().enumerate() {
        if let Some(guard) = &t.guard {
            sites.push((
                ExpressionSite::TransitionGuard {
                    index,
                    from_state: t.from_state.clone(),
                    to_state: t.to_state.clone(),
                },
                guard,
            ));
        }
    }
    sites
}
