//! Parser configuration.
//!
//! # Example
//!
//! ```toml
//! max_depth = 64
//! ```

use serde::Deserialize;

use crate::error::ConfigError;

/// Default limit on expression nesting and tree depth.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Limits applied by the expression parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// Maximum parenthesis nesting and maximum depth of a parsed tree.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Parse a configuration from TOML text. Absent keys take their defaults.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: ParserConfig = toml::from_str(src)?;
        if config.max_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_depth".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(config)
    }
}
