//! Merge engine: the request-level entry points.
//!
//! `normalize` turns raw records into spans, `unionize` groups, resolves and
//! splits them, `serialize` renders the output records. The engine holds only
//! immutable configuration, so one instance can serve concurrent requests.

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::error::EngineError;
use super::factory::{SpanFactory, ValidationError};
use super::merge::{MergePolicy, MergedSpan};
use super::output::MergedRecord;
use super::unionize as sweep;
use crate::config::ResolvedConfig;
use crate::domain::{MergeRequest, PrimaryRecord, SecondaryRecord, Span, Taxonomy};

/// Span reconciliation engine
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    factory: SpanFactory,
    policy: MergePolicy,
}

impl MergeEngine {
    pub fn new(taxonomy: Taxonomy, policy: MergePolicy) -> Self {
        Self {
            factory: SpanFactory::new(taxonomy),
            policy,
        }
    }

    /// Engine built from the resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            Taxonomy::with_secondary_overrides(&config.secondary_types),
            config.merge,
        )
    }

    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        self.factory.taxonomy()
    }

    /// Validate raw records into one flat span list, primary first.
    ///
    /// Secondary tokens tagged `O` are dropped.
    pub fn normalize(
        &self,
        primary: &[PrimaryRecord],
        secondary: &[SecondaryRecord],
    ) -> Result<Vec<Span>, EngineError> {
        let mut spans = Vec::with_capacity(primary.len() + secondary.len());

        for record in primary {
            spans.push(self.factory.from_primary(record)?);
        }

        let mut outside = 0;
        for record in secondary {
            if record.is_outside() {
                outside += 1;
                continue;
            }
            spans.push(self.factory.from_secondary(record)?);
        }

        debug!(
            primary = primary.len(),
            secondary = secondary.len() - outside,
            outside,
            "Normalized annotator records"
        );
        Ok(spans)
    }

    /// Pre-split overlap groups
    pub fn group(&self, spans: Vec<Span>) -> Result<Vec<MergedSpan>, EngineError> {
        sweep::group(spans, &self.policy)
    }

    /// Final output spans in left-to-right order
    pub fn unionize(&self, spans: Vec<Span>) -> Result<Vec<MergedSpan>, EngineError> {
        sweep::unionize(spans, &self.policy)
    }

    /// Render output records as a JSON array
    pub fn serialize(&self, merged: &[MergedSpan], detailed: bool) -> Result<Value, EngineError> {
        Ok(serialize(merged, detailed)?)
    }

    /// Normalize and unionize one request
    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub fn run(&self, request: &MergeRequest) -> Result<Vec<MergedSpan>, EngineError> {
        if request.extract_text.is_empty() {
            return Err(ValidationError::EmptyText.into());
        }

        let spans = self.normalize(&request.primary, &request.secondary)?;
        let span_count = spans.len();
        let merged = self.unionize(spans)?;

        info!(spans = span_count, output = merged.len(), "Merged annotations");
        Ok(merged)
    }

    /// Run the whole pipeline and render the result
    pub fn process(&self, request: &MergeRequest) -> Result<Value, EngineError> {
        let merged = self.run(request)?;
        self.serialize(&merged, request.annotation_by_source)
    }
}

/// Normalize with the built-in taxonomy
pub fn normalize(
    primary: &[PrimaryRecord],
    secondary: &[SecondaryRecord],
) -> Result<Vec<Span>, EngineError> {
    MergeEngine::default().normalize(primary, secondary)
}

/// Unionize with the default policy
pub fn unionize(spans: Vec<Span>) -> Result<Vec<MergedSpan>, EngineError> {
    sweep::unionize(spans, &MergePolicy::default())
}

pub fn serialize(merged: &[MergedSpan], detailed: bool) -> Result<Value, serde_json::Error> {
    let records: Vec<MergedRecord> = merged
        .iter()
        .map(|m| MergedRecord::new(m, detailed))
        .collect();
    serde_json::to_value(records)
}
