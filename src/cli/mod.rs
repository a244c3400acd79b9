//! Command-line interface for phimerge.
//!
//! Provides commands for merging saved annotator output, inspecting the
//! pre-split overlap groups, and showing the effective taxonomy and
//! configuration.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::warn;

use crate::adapters::{self, JsonFileAnnotator};
use crate::config;
use crate::core::{Annotation, MergeEngine, MergedSpan};
use crate::domain::{MergeReport, MergeRequest};

/// phimerge - reconcile PHI spans from multiple annotators
#[derive(Parser, Debug)]
#[command(name = "phimerge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge annotator output into canonical spans
    Merge {
        #[command(flatten)]
        input: InputArgs,

        /// Include per-source records in every span
        #[arg(short, long)]
        detailed: bool,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Show overlap groups before subtype splitting
    Groups {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show the effective secondary type map
    Taxonomy,

    /// Show resolved configuration (debug)
    Config,
}

/// Where the document and its annotations come from
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Full request JSON (extract_text, primary, secondary)
    #[arg(short, long, conflicts_with_all = ["primary", "secondary", "text"])]
    pub request: Option<PathBuf>,

    /// Primary annotator records (JSON array)
    #[arg(long, requires = "secondary")]
    pub primary: Option<PathBuf>,

    /// Secondary annotator records (JSON array)
    #[arg(long, requires = "primary")]
    pub secondary: Option<PathBuf>,

    /// Source text file (reads from stdin if not provided)
    #[arg(short, long)]
    pub text: Option<PathBuf>,
}

impl InputArgs {
    /// Assemble the merge request from files (and stdin)
    async fn load(&self) -> Result<MergeRequest> {
        if let Some(path) = &self.request {
            return adapters::load_request(path).await;
        }

        let (Some(primary), Some(secondary)) = (&self.primary, &self.secondary) else {
            anyhow::bail!("Provide --request <file> or both --primary and --secondary");
        };

        let text = match &self.text {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read text file: {}", path.display()))?,
            None => {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read text from stdin")?;
                buffer
            }
        };

        adapters::gather(
            text,
            &JsonFileAnnotator::primary(primary),
            &JsonFileAnnotator::secondary(secondary),
        )
        .await
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Merge {
                input,
                detailed,
                pretty,
            } => merge(&input, detailed, pretty).await,
            Commands::Groups { input } => show_groups(&input).await,
            Commands::Taxonomy => show_taxonomy(),
            Commands::Config => show_config(),
        }
    }
}

/// Warn about spans whose text is not the document slice they claim
fn check_against_document(spans: &[MergedSpan], document: &str) -> usize {
    let mut mismatches = 0;
    for span in spans {
        let annotation = Annotation::from(span.clone());
        if !annotation.matches(document) {
            mismatches += 1;
            warn!(
                start = annotation.start(),
                end = annotation.end(),
                text = annotation.text(),
                "Span text does not match the document"
            );
        }
    }
    mismatches
}

/// Merge and print the report
async fn merge(input: &InputArgs, detailed: bool, pretty: bool) -> Result<()> {
    let cfg = config::config()?;
    let engine = MergeEngine::from_config(cfg);

    let mut request = input.load().await?;
    request.annotation_by_source |= detailed || cfg.detailed;

    let merged = engine
        .run(&request)
        .with_context(|| format!("Merge failed for request {}", request.request_id))?;
    check_against_document(&merged, &request.extract_text);

    let spans = engine
        .serialize(&merged, request.annotation_by_source)
        .context("Failed to serialize spans")?;
    let report = MergeReport::new(request.request_id, spans);

    let rendered = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Failed to serialize report")?;

    println!("{}", rendered);
    Ok(())
}

/// List pre-split overlap groups
async fn show_groups(input: &InputArgs) -> Result<()> {
    let engine = MergeEngine::from_config(config::config()?);
    let request = input.load().await?;

    let spans = engine.normalize(&request.primary, &request.secondary)?;
    let groups = engine.group(spans)?;

    if groups.is_empty() {
        println!("No spans found");
        return Ok(());
    }

    println!(
        "{:<12} {:<24} {:<8} {:<8} {}",
        "RANGE", "TYPE", "SCORE", "SOURCES", "TEXT"
    );
    println!("{}", "-".repeat(75));

    for group in &groups {
        println!(
            "{:<12} {:<24} {:<8.2} {:<8} {}",
            format!("[{},{})", group.start(), group.end()),
            group.entity_type(),
            group.score(),
            group.sources().len(),
            group.text()
        );
    }

    println!();
    println!("{} group(s)", groups.len());
    Ok(())
}

/// Print the effective secondary label map
fn show_taxonomy() -> Result<()> {
    let engine = MergeEngine::from_config(config::config()?);
    let map = engine.taxonomy().secondary();

    println!("{:<28} {}", "SECONDARY LABEL", "PARENT");
    println!("{}", "-".repeat(44));
    for (raw, parent) in map.iter() {
        println!("{:<28} {}", raw, parent);
    }
    Ok(())
}

fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("phimerge configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Merge:");
    println!("  Threshold:      {}", cfg.merge.threshold);
    println!("  Join adjacent:  {}", cfg.merge.join_adjacent);
    println!();
    println!("Output:");
    println!("  Detailed:       {}", cfg.detailed);
    println!();
    println!("Secondary taxonomy overrides:");
    if cfg.secondary_types.is_empty() {
        println!("  (using defaults)");
    } else {
        for (k, v) in &cfg.secondary_types {
            println!("  {}: {}", k, v);
        }
    }

    Ok(())
}
