//! Error type returned by the engine's public operations.

use thiserror::Error;

use super::factory::ValidationError;
use super::merge::MergeError;
use super::split::IncompatibleTypeError;

/// Any failure of normalize / unionize / split / serialize
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed annotator record or request
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Merge contract violation
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Split of a group without a shared parent label
    #[error(transparent)]
    IncompatibleType(#[from] IncompatibleTypeError),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}
