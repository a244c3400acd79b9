//! Request and report envelopes around one merge run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::records::{PrimaryRecord, SecondaryRecord};

/// One document plus every annotator's raw records for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Correlates log lines and the report for this run
    #[serde(default = "Uuid::new_v4")]
    pub request_id: Uuid,

    /// Source text every offset points into
    pub extract_text: String,

    #[serde(default)]
    pub primary: Vec<PrimaryRecord>,

    #[serde(default)]
    pub secondary: Vec<SecondaryRecord>,

    /// Include per-source records in the output
    #[serde(default)]
    pub annotation_by_source: bool,
}

impl MergeRequest {
    pub fn new(extract_text: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            extract_text: extract_text.into(),
            primary: Vec::new(),
            secondary: Vec::new(),
            annotation_by_source: false,
        }
    }

    pub fn with_primary(mut self, records: Vec<PrimaryRecord>) -> Self {
        self.primary = records;
        self
    }

    pub fn with_secondary(mut self, records: Vec<SecondaryRecord>) -> Self {
        self.secondary = records;
        self
    }

    pub fn detailed(mut self, detailed: bool) -> Self {
        self.annotation_by_source = detailed;
        self
    }
}

/// Envelope printed by the CLI around the serialized spans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub request_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub span_count: usize,
    pub spans: serde_json::Value,
}

impl MergeReport {
    pub fn new(request_id: Uuid, spans: serde_json::Value) -> Self {
        let span_count = spans.as_array().map_or(0, Vec::len);
        Self {
            request_id,
            created_at: Utc::now(),
            span_count,
            spans,
        }
    }
}
