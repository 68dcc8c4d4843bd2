//! S3 -- Cycle detection.
//!
//! Three-colour depth-first search (white = unvisited, grey = on the
//! current path, black = finished). Every edge into a grey node closes a
//! cycle, which is read off the current path. Cycles are stored rotated so
//! that their smallest id comes first; a cycle found twice is kept once.
//!
//! The search keeps its own stack, so long question chains cannot exhaust
//! the thread stack.

use crate::structure::Graph;
use cslm_core::{Survey, START};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Aggregated S3 result.
#[derive(Debug, Clone, Serialize)]
pub struct S3Result {
    /// Each cycle as the ordered state ids along it, without repeating the
    /// first id at the end. In discovery order.
    pub cycles: Vec<Vec<String>>,
    pub has_cycles: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colour {
    White,
    Grey,
    Black,
}

pub fn analyze_cycles(survey: &Survey) -> S3Result {
    let graph = Graph::new(survey);
    let mut colour: HashMap<&str, Colour> = HashMap::new();
    let mut seen: HashSet<Vec<&str>> = HashSet::new();
    let mut cycles: Vec<Vec<String>> = Vec::new();

    // START first so discovery order follows the interview; then every
    // state, to reach components START does not.
    let roots = std::iter::once(START).chain(survey.states().iter().map(|s| s.id.as_str()));

    for root in roots {
        if colour.get(root).copied().unwrap_or(Colour::White) != Colour::White {
            continue;
        }
        colour.insert(root, Colour::Grey);
        // (node, index of the next successor to explore)
        let mut frames: Vec<(&str, usize)> = vec![(root, 0)];

        while let Some(&(node, next_index)) = frames.last() {
            let successors = graph.successors(node);
            if next_index >= successors.len() {
                colour.insert(node, Colour::Black);
                frames.pop();
                continue;
            }
            if let Some(top) = frames.last_mut() {
                top.1 += 1;
            }

            let next = successors[next_index];
            match colour.get(next).copied().unwrap_or(Colour::White) {
                Colour::White => {
                    colour.insert(next, Colour::Grey);
                    frames.push((next, 0));
                }
                Colour::Grey => {
                    let start = frames.iter().position(|(n, _)| *n == next).unwrap_or(0);
                    let path: Vec<&str> = frames[start..].iter().map(|(n, _)| *n).collect();
                    let cycle = canonical_rotation(path);
                    if seen.insert(cycle.clone()) {
                        cycles.push(cycle.into_iter().map(str::to_string).collect());
                    }
                }
                Colour::Black => {}
            }
        }
    }

    if !cycles.is_empty() {
        tracing::debug!(count = cycles.len(), "cycles detected");
    }

    S3Result {
        has_cycles: !cycles.is_empty(),
        cycles,
    }
}

/// Rotate so the lexicographically smallest id leads.
fn canonical_rotation(mut cycle: Vec<&str>) -> Vec<&str> {
    let lead = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle.rotate_left(lead);
    cycle
}
