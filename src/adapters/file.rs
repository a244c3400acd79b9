//! File adapter: replays annotator output saved as a JSON array.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::{Annotator, AnnotatorOutput};
use crate::domain::Origin;

/// Annotator backed by a JSON file of raw records
#[derive(Debug, Clone)]
pub struct JsonFileAnnotator {
    origin: Origin,
    path: PathBuf,
}

impl JsonFileAnnotator {
    pub fn new(origin: Origin, path: impl Into<PathBuf>) -> Self {
        Self {
            origin,
            path: path.into(),
        }
    }

    pub fn primary(path: impl Into<PathBuf>) -> Self {
        Self::new(Origin::Primary, path)
    }

    pub fn secondary(path: impl Into<PathBuf>) -> Self {
        Self::new(Origin::Secondary, path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Annotator for JsonFileAnnotator {
    fn name(&self) -> &str {
        match self.origin {
            Origin::Primary => "primary-file",
            Origin::Secondary => "secondary-file",
        }
    }

    fn origin(&self) -> Origin {
        self.origin
    }

    /// The text is not consulted; the file already holds its annotations.
    async fn annotate(&self, _text: &str) -> Result<AnnotatorOutput> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read annotations: {}", self.path.display()))?;

        let output = match self.origin {
            Origin::Primary => AnnotatorOutput::Primary(
                serde_json::from_str(&content).with_context(|| {
                    format!("Failed to parse primary records: {}", self.path.display())
                })?,
            ),
            Origin::Secondary => AnnotatorOutput::Secondary(
                serde_json::from_str(&content).with_context(|| {
                    format!("Failed to parse secondary records: {}", self.path.display())
                })?,
            ),
        };

        debug!(path = %self.path.display(), records = output.len(), "Loaded annotations");
        Ok(output)
    }
}
