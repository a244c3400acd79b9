//! Output records for finalized spans.

use serde::Serialize;

use super::merge::MergedSpan;
use crate::domain::{Origin, Span};

/// Origin tag carried by every finalized output span
pub const MERGED_ORIGIN: &str = "merged";

/// One source span as it appears under `source_annotations`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanRecord {
    pub origin: Origin,
    pub start: usize,
    pub end: usize,
    pub score: f64,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub text: String,
}

impl From<&Span> for SpanRecord {
    fn from(span: &Span) -> Self {
        Self {
            origin: span.origin(),
            start: span.start(),
            end: span.end(),
            score: span.score(),
            entity_type: span.entity_type().to_string(),
            text: span.text().to_string(),
        }
    }
}

/// One finalized span
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub origin: &'static str,
    pub start: usize,
    pub end: usize,
    pub score: f64,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub text: String,
    /// Distinct raw labels, sorted
    pub source_types: Vec<String>,
    /// Source scores in insertion order
    pub source_scores: Vec<f64>,
    /// Distinct origins, sorted
    pub source_origins: Vec<Origin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_annotations: Option<Vec<SpanRecord>>,
}

impl MergedRecord {
    pub fn new(merged: &MergedSpan, detailed: bool) -> Self {
        Self {
            origin: MERGED_ORIGIN,
            start: merged.start(),
            end: merged.end(),
            score: merged.score(),
            entity_type: merged.entity_type().to_string(),
            text: merged.text().to_string(),
            source_types: merged.source_types().into_iter().map(str::to_string).collect(),
            source_scores: merged.source_scores(),
            source_origins: merged.source_origins().into_iter().collect(),
            source_annotations: detailed
                .then(|| merged.sources().iter().map(SpanRecord::from).collect()),
        }
    }
}
