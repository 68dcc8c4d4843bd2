//! Analyzer thresholds.
//!
//! # Example
//!
//! ```toml
//! simple_max_nodes = 5
//! moderate_max_nodes = 15
//! deep_expression_depth = 4
//! ```

use cslm_core::ConfigError;
use serde::Deserialize;

/// Complexity thresholds. Absent keys take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Expressions with at most this many nodes are simple.
    pub simple_max_nodes: usize,
    /// Expressions with at most this many nodes (and more than
    /// `simple_max_nodes`) are moderate; larger ones are complex.
    pub moderate_max_nodes: usize,
    /// Expressions deeper than this are flagged even when not complex.
    pub deep_expression_depth: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            simple_max_nodes: 7,
            moderate_max_nodes: 19,
            deep_expression_depth: 5,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: AnalyzerConfig = toml::from_str(src)?;
        if config.moderate_max_nodes < config.simple_max_nodes {
            return Err(ConfigError::Invalid {
                field: "moderate_max_nodes".to_string(),
                message: format!(
                    "{} is below simple_max_nodes ({})",
                    config.moderate_max_nodes, config.simple_max_nodes
                ),
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.simple_max_nodes, 7);
        assert_eq!(config.moderate_max_nodes, 19);
        assert_eq!(config.deep_expression_depth, 5);
    }

    #[test]
    fn test_partial_override() {
        let config = AnalyzerConfig::from_toml_str("deep_expression_depth = 8").unwrap();
        assert_eq!(config.deep_expression_depth, 8);
        assert_eq!(config.simple_max_nodes, 7);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let err = AnalyzerConfig::from_toml_str("simple_max_nodes = 10\nmoderate_max_nodes = 4")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = AnalyzerConfig::from_toml_str("simple_max_nodes = \"seven\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
