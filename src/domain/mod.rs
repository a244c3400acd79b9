//! Domain types for phimerge.
//!
//! This module contains the data the engine works on:
//! - Span: one annotator's typed claim over a text range
//! - Taxonomy: raw label to parent label tables
//! - Records: raw annotator output as it arrives on the wire
//! - Request: merge request and report envelopes

pub mod records;
pub mod request;
pub mod span;
pub mod taxonomy;

// Re-export commonly used types
pub use records::{PrimaryRecord, SecondaryRecord, OUTSIDE_LABEL};
pub use request::{MergeReport, MergeRequest};
pub use span::{Origin, Span};
pub use taxonomy::{Taxonomy, TypeMap, SECONDARY_TYPE_MAP};
