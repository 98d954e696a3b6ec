//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

use crate::config::CliOverrides;

/// Exit codes
pub mod exit_codes {
    /// Run completed (per-file warnings and decode errors included)
    pub const SUCCESS: i32 = 0;
    /// Fatal setup error or output directory failure
    pub const GENERAL_ERROR: i32 = 1;
    /// Input path does not exist
    pub const INPUT_NOT_FOUND: i32 = 3;
}

/// Auto-crop scanned pages to their content
#[derive(Parser, Debug)]
#[command(name = "pagetrim", version, about, long_about = None)]
pub struct Cli {
    /// Input directory or single image [default: input]
    pub input: Option<PathBuf>,

    /// Output directory, mirrors the input tree [default: output]
    pub output: Option<PathBuf>,

    /// TOML config file (default: ./pagetrim.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ignore blobs smaller than this fraction of the page [default: 0.01]
    #[arg(long, value_name = "RATIO")]
    pub min_area_ratio: Option<f64>,

    /// Closing structuring element, WxH or N [default: 5x5]
    #[arg(long, value_name = "WxH", value_parser = parse_kernel)]
    pub kernel: Option<(u32, u32)>,

    /// Pixels kept around the content [default: 5]
    #[arg(long, value_name = "PX")]
    pub padding: Option<u32>,

    /// Fixed binarization level instead of Otsu
    #[arg(long, value_name = "0-255")]
    pub threshold: Option<u8>,

    /// Worker threads (1 = sequential) [default: all CPUs]
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// JPEG output quality [default: 95]
    #[arg(long, value_name = "1-100", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: Option<u8>,

    /// Leave images whose output already exists untouched
    #[arg(long)]
    pub skip_existing: bool,

    /// Show what would be done without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Values the user set explicitly
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            input: self.input.clone(),
            output: self.output.clone(),
            min_area_ratio: self.min_area_ratio,
            closing_kernel: self.kernel,
            padding: self.padding,
            threshold: self.threshold,
            threads: self.threads,
            jpeg_quality: self.jpeg_quality,
            skip_existing: self.skip_existing.then_some(true),
        }
    }
}

/// Parse `WxH` (or a single `N` for a square element)
pub fn parse_kernel(s: &str) -> Result<(u32, u32), String> {
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid kernel size '{}': {}", part, e))
    };

    match s.split_once(['x', 'X']) {
        Some((w, h)) => Ok((parse(w)?, parse(h)?)),
        None => {
            let n = parse(s)?;
            Ok((n, n))
        }
    }
}
