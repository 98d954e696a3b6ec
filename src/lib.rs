//! pagetrim - auto-crop scanned pages to their content
//!
//! Every page is binarized with Otsu's method, nearby ink is merged by a
//! morphological closing, small blobs are discarded and the page is cropped
//! to one padded box around what is left. Directory trees are processed in
//! bulk with the output tree mirroring the input.
//!
//! # Modules
//!
//! - [`trim`] - per-page content detection and cropping
//! - [`batch`] - tree walking, output mirroring, parallel processing
//! - [`config`] - TOML config file and CLI override merging
//! - [`progress`] - per-file status and batch summary
//! - [`cli`] - command-line arguments and exit codes

pub mod batch;
pub mod cli;
pub mod config;
pub mod progress;
pub mod trim;

pub use batch::{BatchOptions, BatchTrimmer, TreeWalker, TrimJob, WalkEntry};
pub use cli::{exit_codes, Cli};
pub use config::{CliOverrides, Config, ConfigError};
pub use progress::{BatchSummary, FileStatus};
pub use trim::{
    ContentRect, PageDetection, PageTrimmer, PipelineConfig, PipelineConfigBuilder, TrimError,
    TrimOutcome,
};
