//! Transition inference from entry guards.
//!
//! A guard that mentions another question's variable is read as "this
//! question follows that one": each such variable yields an edge from the
//! named state, carrying the guard. A state whose guard names no other
//! state is reached from `START`. The result is a plain list of explicit
//! transitions; nothing about row order survives into the survey.

use std::collections::HashSet;

use crate::model::{State, Transition, START};

pub(super) fn infer_transitions(states: &[State]) -> Vec<Transition> {
    let ids: HashSet<&str> = states.iter().map(|s| s.id.as_str()).collect();
    let mut transitions = Vec::new();

    for state in states {
        let Some(guard) = &state.entry_guard else {
            transitions.push(Transition::new(START, state.id.clone()));
            continue;
        };

        let before = transitions.len();
        for name in guard.variable_names() {
            if name != state.id && ids.contains(name) {
                transitions.push(Transition::guarded(name, state.id.clone(), guard.clone()));
            }
        }
        if transitions.len() == before {
            transitions.push(Transition::guarded(START, state.id.clone(), guard.clone()));
        }
    }

    tracing::debug!(count = transitions.len(), "inferred transitions");
    transitions
}
