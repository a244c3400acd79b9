//! Configuration for phimerge.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (PHIMERGE_THRESHOLD, PHIMERGE_JOIN_ADJACENT)
//! 2. Config file (.phimerge/config.yaml, or the file named by PHIMERGE_CONFIG)
//! 3. Defaults (threshold 0.5, adjacent spans joined)
//!
//! Config file discovery:
//! - Searches current directory and parents for .phimerge/config.yaml
//! - Falls back to ~/.phimerge/config.yaml

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::merge::{MergePolicy, TYPE_THRESHOLD};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".phimerge";
const CONFIG_FILE: &str = "config.yaml";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub merge: Option<MergeConfig>,
    #[serde(default)]
    pub output: Option<OutputConfig>,
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    pub threshold: Option<f64>,
    pub join_adjacent: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub detailed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxonomyConfig {
    /// Extra secondary label -> parent label entries
    #[serde(default)]
    pub secondary: BTreeMap<String, String>,
}

/// Resolved configuration
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    /// Grouping and resolution policy
    pub merge: MergePolicy,
    /// Default for per-source output records
    pub detailed: bool,
    /// Secondary taxonomy entries added on top of the built-in table
    pub secondary_types: BTreeMap<String, String>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Environment overrides, captured once so resolution stays testable
#[derive(Debug, Clone, Default)]
struct EnvOverrides {
    config: Option<PathBuf>,
    threshold: Option<String>,
    join_adjacent: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            config: std::env::var("PHIMERGE_CONFIG").ok().map(PathBuf::from),
            threshold: std::env::var("PHIMERGE_THRESHOLD").ok(),
            join_adjacent: std::env::var("PHIMERGE_JOIN_ADJACENT").ok(),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("Invalid boolean in {}: {}", name, other),
    }
}

fn validate_threshold(threshold: f64) -> Result<f64> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("Merge threshold must lie in [0, 1], got {}", threshold);
    }
    Ok(threshold)
}

/// Merge file contents and environment overrides over the defaults
fn resolve(file: Option<(PathBuf, ConfigFile)>, env: &EnvOverrides) -> Result<ResolvedConfig> {
    let (config_file, file) = match file {
        Some((path, file)) => (Some(path), Some(file)),
        None => (None, None),
    };

    let merge = file.as_ref().and_then(|f| f.merge.as_ref());

    let threshold = match &env.threshold {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid number in PHIMERGE_THRESHOLD: {}", raw))?,
        None => merge.and_then(|m| m.threshold).unwrap_or(TYPE_THRESHOLD),
    };

    let join_adjacent = match &env.join_adjacent {
        Some(raw) => parse_bool("PHIMERGE_JOIN_ADJACENT", raw)?,
        None => merge.and_then(|m| m.join_adjacent).unwrap_or(true),
    };

    let detailed = file
        .as_ref()
        .and_then(|f| f.output.as_ref())
        .and_then(|o| o.detailed)
        .unwrap_or(false);

    let secondary_types = file.map(|f| f.taxonomy.secondary).unwrap_or_default();

    Ok(ResolvedConfig {
        merge: MergePolicy {
            threshold: validate_threshold(threshold)?,
            join_adjacent,
        },
        detailed,
        secondary_types,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let env = EnvOverrides::from_env();

    let path = match &env.config {
        Some(path) => Some(path.clone()),
        None => find_config_file(),
    };

    let file = match path {
        Some(path) => {
            let file = load_config_file(&path)?;
            Some((path, file))
        }
        None => None,
    };

    resolve(file, &env)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
