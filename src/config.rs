//! Configuration file support
//!
//! Settings come from a TOML file (`./pagetrim.toml`, then the user config
//! directory) and are overridden by values given explicitly on the command
//! line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::batch::{BatchOptions, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use crate::trim::{
    PipelineConfig, DEFAULT_CLOSING_KERNEL, DEFAULT_JPEG_QUALITY, DEFAULT_MIN_AREA_RATIO,
    DEFAULT_PADDING,
};

/// Config file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "pagetrim.toml";

/// Config error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// `[trim]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrimSection {
    pub min_area_ratio: f64,
    pub closing_kernel: [u32; 2],
    pub padding: u32,
    pub threshold: Option<u8>,
}

impl Default for TrimSection {
    fn default() -> Self {
        Self {
            min_area_ratio: DEFAULT_MIN_AREA_RATIO,
            closing_kernel: [DEFAULT_CLOSING_KERNEL.0, DEFAULT_CLOSING_KERNEL.1],
            padding: DEFAULT_PADDING,
            threshold: None,
        }
    }
}

/// `[paths]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub jpeg_quality: u8,
    pub skip_existing: bool,
    pub threads: Option<usize>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            skip_existing: false,
            threads: None,
        }
    }
}

/// Contents of a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub trim: TrimSection,
    pub paths: PathsSection,
    pub output: OutputSection,
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub min_area_ratio: Option<f64>,
    pub closing_kernel: Option<(u32, u32)>,
    pub padding: Option<u32>,
    pub threshold: Option<u8>,
    pub threads: Option<usize>,
    pub jpeg_quality: Option<u8>,
    pub skip_existing: Option<bool>,
}

impl CliOverrides {
    /// Create empty overrides
    pub fn new() -> Self {
        Self::default()
    }
}

impl Config {
    /// Parse config from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Candidate config locations, highest priority first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("pagetrim").join("config.toml"));
        }
        paths
    }

    /// Load the first config found in [`Config::search_paths`], or defaults
    pub fn load() -> Result<Self, ConfigError> {
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Merge with CLI overrides (CLI takes precedence)
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> (PipelineConfig, BatchOptions) {
        let kernel = cli
            .closing_kernel
            .unwrap_or((self.trim.closing_kernel[0], self.trim.closing_kernel[1]));

        let pipeline = PipelineConfig::builder()
            .min_area_ratio(cli.min_area_ratio.unwrap_or(self.trim.min_area_ratio))
            .closing_kernel(kernel.0, kernel.1)
            .padding(cli.padding.unwrap_or(self.trim.padding))
            .threshold_override(cli.threshold.or(self.trim.threshold))
            .jpeg_quality(cli.jpeg_quality.unwrap_or(self.output.jpeg_quality))
            .build();

        let batch = BatchOptions {
            input_root: cli.input.clone().unwrap_or_else(|| self.paths.input.clone()),
            output_root: cli
                .output
                .clone()
                .unwrap_or_else(|| self.paths.output.clone()),
            threads: cli.threads.or(self.output.threads),
            skip_existing: cli.skip_existing.unwrap_or(self.output.skip_existing),
        };

        (pipeline, batch)
    }
}
