use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

use crate::sampling::SamplingParams;

pub const DEFAULT_EPSILON: f64 = 0.2;

pub const DEFAULT_DELTA: f64 = 0.3;

pub const DEFAULT_C: f64 = 1.0;

pub const DEFAULT_VD_SAMPLES: u32 = 10;

/// Redraws allowed per sampling trial when the drawn pair is not connected.
pub const DEFAULT_RETRY_BUDGET: u32 = 100;

pub const DEFAULT_DELIMITER: &str = "\t";

pub const DEFAULT_OUTPUT_PREFIX: &str = "out";

pub const DEFAULT_LOG_DIR: &str = "logs";

/// Which betweenness backend drives the edge removal loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Girvan-Newman, full Brandes recomputation every round.
    #[default]
    Gn,
    /// Girvan-Newman, recomputing only the components that lost an edge.
    GnIncremental,
    /// Girvan-Newman over sampled betweenness.
    Bsa,
}

/// Settings of one run, usually read from a YAML file and then overridden by
/// command line flags. Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub algorithm: Algorithm,
    pub delimiter: String,
    pub output_prefix: String,
    pub log_dir: String,
    pub seed: Option<u64>,
    pub sampling: SamplingParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            algorithm: Algorithm::default(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
            seed: None,
            sampling: SamplingParams::default(),
        }
    }
}

impl RunConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("failed to parse run config")
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open config file {}", path.display()))?;
        serde_yaml::from_reader(file)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}
