//! Generator configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration for the state-space generator.
///
/// ```toml
/// max_depth = 12
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Deepest level at which a node is still expanded. Roots sit at
    /// depth 1. `None` explores until the reachable value space is exhausted,
    /// which only terminates if that space is finite.
    pub max_depth: Option<usize>,
}

impl GeneratorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Builder form setting the depth bound.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Whether children of a node at `depth` may be expanded.
    pub fn allows_expansion(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth < max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NarrativeError;

    #[test]
    fn test_default_is_unbounded() {
        let config = GeneratorConfig::default();
        assert_eq!(config.max_depth, None);
        assert!(config.allows_expansion(usize::MAX - 1));
    }

    #[test]
    fn test_depth_bound() {
        let config = GeneratorConfig::default().with_max_depth(2);
        assert!(config.allows_expansion(1));
        assert!(!config.allows_expansion(2));
    }

    #[test]
    fn test_from_toml() {
        let config = GeneratorConfig::from_toml_str("max_depth = 12").unwrap();
        assert_eq!(config.max_depth, Some(12));

        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());

        assert!(matches!(
            GeneratorConfig::from_toml_str("max_depth = \"deep\""),
            Err(NarrativeError::Config(_))
        ));
    }
}
