//! S4 -- Expression complexity.
//!
//! Node count and depth (root depth = 1) of every expression attached to
//! a state or transition, classified by node count.

use crate::config::AnalyzerConfig;
use crate::structure::{expression_sites, ExpressionSite};
use cslm_core::Survey;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ComplexityClass {
    Simple,
    Moderate,
    Complex,
}

impl ComplexityClass {
    pub fn classify(node_count: usize, config: &AnalyzerConfig) -> Self {
        if node_count <= config.simple_max_nodes {
            ComplexityClass::Simple
        } else if node_count <= config.moderate_max_nodes {
            ComplexityClass::Moderate
        } else {
            ComplexityClass::Complex
        }
    }
}

/// Complexity of one expression.
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionComplexity {
    pub site: ExpressionSite,
    pub node_count: usize,
    pub depth: usize,
    pub class: ComplexityClass,
    /// Complex, or deeper than `deep_expression_depth`.
    pub high: bool,
}

/// Aggregated S4 result.
#[derive(Debug, Clone, Serialize)]
pub struct S4Result {
    /// In survey order.
    pub expressions: Vec<ExpressionComplexity>,
    pub class_counts: BTreeMap<ComplexityClass, usize>,
    pub max_depth: usize,
    /// 0.0 when the survey has no expressions.
    pub mean_depth: f64,
    pub total_nodes: usize,
}

pub fn analyze_complexity(survey: &Survey, config: &AnalyzerConfig) -> S4Result {
    let mut expressions = Vec::new();
    let mut class_counts = BTreeMap::new();
    let mut max_depth = 0;
    let mut depth_sum = 0;
    let mut total_nodes = 0;

    for (site, expr) in expression_sites(survey) {
        let node_count = expr.node_count();
        let depth = expr.depth();
        let class = ComplexityClass::classify(node_count, config);

        max_depth = max_depth.max(depth);
        depth_sum += depth;
        total_nodes += node_count;
        *class_counts.entry(class).or_insert(0) += 1;

        expressions.push(ExpressionComplexity {
            site,
            node_count,
            depth,
            class,
            high: class == ComplexityClass::Complex || depth > config.deep_expression_depth,
        });
    }

    let mean_depth = if expressions.is_empty() {
        0.0
    } else {
        depth_sum as f64 / expressions.len() as f64
    };

    S4Result {
        expressions,
        class_counts,
        max_depth,
        mean_depth,
        total_nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cslm_core::{Expression, State};

    fn eq(var: &str, v: i64) -> Expression {
        Expression::eq(Expression::var(var), Expression::int(v))
    }

    /// `n` comparisons joined by OR: 4n - 1 nodes, depth n + 1.
    fn chain(n: usize) -> Expression {
        let mut expr = eq("A", 0);
        for i in 1..n {
            expr = Expression::or(expr, eq("A", i as i64));
        }
        expr
    }

    #[test]
    fn test_classification_thresholds() {
        let config = AnalyzerConfig::default();
        assert_eq!(ComplexityClass::classify(1, &config), ComplexityClass::Simple);
        assert_eq!(ComplexityClass::classify(7, &config), ComplexityClass::Simple);
        assert_eq!(ComplexityClass::classify(8, &config), ComplexityClass::Moderate);
        assert_eq!(ComplexityClass::classify(19, &config), ComplexityClass::Moderate);
        assert_eq!(ComplexityClass::classify(20, &config), ComplexityClass::Complex);
    }

    #[test]
    fn test_metrics_over_survey() {
        let survey = Survey::builder("S")
            .state(State::new("X", "x").with_validation(eq("X", 1)))
            .state(State::new("Y", "y").with_entry_guard(chain(2)))
            .build();
        let result = analyze_complexity(&survey, &AnalyzerConfig::default());

        assert_eq!(result.expressions.len(), 2);
        assert_eq!(result.expressions[0].node_count, 3);
        assert_eq!(result.expressions[0].depth, 2);
        assert_eq!(result.expressions[1].node_count, 7);
        assert_eq!(result.expressions[1].depth, 3);
        assert_eq!(result.max_depth, 3);
        assert_eq!(result.total_nodes, 10);
        assert!((result.mean_depth - 2.5).abs() < 1e-9);
        assert_eq!(result.class_counts[&ComplexityClass::Simple], 2);
    }

    #[test]
    fn test_high_complexity_flag() {
        let survey = Survey::builder("S")
            // 6 comparisons: 23 nodes, complex
            .state(State::new("X", "x").with_entry_guard(chain(6)))
            // 5 comparisons: 19 nodes (moderate) but depth 6
            .state(State::new("Y", "y").with_entry_guard(chain(5)))
            // 2 comparisons: simple and shallow
            .state(State::new("Z", "z").with_entry_guard(chain(2)))
            .build();
        let result = analyze_complexity(&survey, &AnalyzerConfig::default());
        let flags: Vec<(ComplexityClass, bool)> =
            result.expressions.iter().map(|e| (e.class, e.high)).collect();
        assert_eq!(
            flags,
            vec![
                (ComplexityClass::Complex, true),
                (ComplexityClass::Moderate, true),
                (ComplexityClass::Simple, false),
            ]
        );
    }

    #[test]
    fn test_no_expressions() {
        let survey = Survey::builder("S").state(State::new("X", "x")).build();
        let result = analyze_complexity(&survey, &AnalyzerConfig::default());
        assert!(result.expressions.is_empty());
        assert_eq!(result.max_depth, 0);
        assert_eq!(result.mean_depth, 0.0);
    }

    #[test]
    fn test_deep_expression_walk() {
        let mut expr = Expression::var("X");
        for _ in 0..5_000 {
            expr = Expression::not(expr);
        }
        let survey = Survey::builder("S")
            .state(State::new("X", "x").with_entry_guard(expr))
            .build();
        let result = analyze_complexity(&survey, &AnalyzerConfig::default());
        assert_eq!(result.max_depth, 5_001);
    }
}
