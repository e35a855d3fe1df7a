//! Error types for the `narrative_core` crate.

use world_model::ModelError;

/// Errors raised while generating or querying a narrative model.
///
/// Dead ends and failing assertions are not errors; they are reported as
/// ordinary model data.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    /// Author code (a guard, action, or predicate) failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The generator configuration could not be parsed.
    #[error("failed to parse generator configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result alias for narrative operations.
pub type Result<T> = std::result::Result<T, NarrativeError>;
