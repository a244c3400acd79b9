//! Adapter interfaces for annotators.
//!
//! Annotators run outside the engine (NLP services, cached files). An adapter
//! hands back one annotator's raw records for a document; the engine takes
//! it from there.

pub mod file;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::domain::{MergeRequest, Origin, PrimaryRecord, SecondaryRecord};

// Re-export the file adapter
pub use file::JsonFileAnnotator;

/// Raw records from one annotator
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotatorOutput {
    Primary(Vec<PrimaryRecord>),
    Secondary(Vec<SecondaryRecord>),
}

impl AnnotatorOutput {
    pub fn origin(&self) -> Origin {
        match self {
            AnnotatorOutput::Primary(_) => Origin::Primary,
            AnnotatorOutput::Secondary(_) => Origin::Secondary,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnnotatorOutput::Primary(records) => records.len(),
            AnnotatorOutput::Secondary(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait for annotator adapters
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Human-readable annotator name
    fn name(&self) -> &str;

    /// Which record schema this annotator produces
    fn origin(&self) -> Origin;

    /// Annotate `text`, returning raw records
    async fn annotate(&self, text: &str) -> Result<AnnotatorOutput>;
}

/// Run both annotators concurrently and assemble a request
pub async fn gather(
    text: String,
    primary: &dyn Annotator,
    secondary: &dyn Annotator,
) -> Result<MergeRequest> {
    let (first, second) = tokio::try_join!(primary.annotate(&text), secondary.annotate(&text))?;

    let primary_records = match first {
        AnnotatorOutput::Primary(records) => records,
        other => anyhow::bail!(
            "Annotator '{}' returned {} records, expected primary",
            primary.name(),
            other.origin()
        ),
    };

    let secondary_records = match second {
        AnnotatorOutput::Secondary(records) => records,
        other => anyhow::bail!(
            "Annotator '{}' returned {} records, expected secondary",
            secondary.name(),
            other.origin()
        ),
    };

    tracing::debug!(
        primary = primary_records.len(),
        secondary = secondary_records.len(),
        "Gathered annotator output"
    );

    Ok(MergeRequest::new(text)
        .with_primary(primary_records)
        .with_secondary(secondary_records))
}

/// Load a full request from a JSON file
pub async fn load_request(path: &std::path::Path) -> Result<MergeRequest> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read request file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse request file: {}", path.display()))
}
