//! phimerge - PHI span reconciliation engine
//!
//! Two annotators flag protected health information in the same document,
//! each with its own record schema, score scale and label vocabulary. This
//! crate turns their output into one typed, non-overlapping set of spans.
//!
//! # Architecture
//!
//! The pipeline is pure and synchronous:
//! - Raw records are validated into spans (`core::factory`)
//! - Spans are partitioned into overlap groups by a sweep line (`core::unionize`)
//! - Each group is merged and its type/score resolved (`core::merge`)
//! - Groups agreeing only on the parent label are split into subtype runs
//!   (`core::split`)
//!
//! # Modules
//!
//! - `adapters`: Annotator integrations (JSON files)
//! - `core`: Reconciliation logic (Factory, Merge, Split, Unionize, Engine)
//! - `domain`: Data structures (Span, Taxonomy, raw records, request)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Merge saved annotator output
//! phimerge merge --primary primary.json --secondary secondary.json --text note.txt
//!
//! # Inspect overlap groups before splitting
//! phimerge groups --request request.json
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{Annotator, AnnotatorOutput, JsonFileAnnotator};
pub use crate::core::{
    normalize, serialize, unionize, Annotation, EngineError, IncompatibleTypeError, MergeEngine,
    MergeError, MergePolicy, MergedSpan, ValidationError,
};
pub use domain::{MergeReport, MergeRequest, Origin, PrimaryRecord, SecondaryRecord, Span, Taxonomy};
