//! Core reconciliation logic.
//!
//! This module contains:
//! - Factory: raw record validation into spans
//! - Merge: group accumulation and type/score resolution
//! - Split: subtype run decomposition
//! - Unionize: sweep-line overlap grouping
//! - Engine: request-level entry points

pub mod annotation;
pub mod engine;
pub mod error;
pub mod factory;
pub mod merge;
pub mod output;
pub mod split;
pub mod unionize;

// Re-export commonly used types
pub use annotation::Annotation;
pub use engine::{normalize, serialize, unionize, MergeEngine};
pub use error::EngineError;
pub use factory::{SpanFactory, ValidationError};
pub use merge::{
    Agreement, MergeError, MergePolicy, MergedSpan, Resolution, SpanGroup, TYPE_THRESHOLD,
    UNKNOWN_TYPE,
};
pub use output::{MergedRecord, SpanRecord, MERGED_ORIGIN};
pub use split::{split, IncompatibleTypeError};
pub use unionize::{group, partition};
