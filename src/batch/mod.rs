//! Directory-tree batch trimming
//!
//! Walks an input tree, mirrors every directory under the output root and
//! trims each image into its mirrored location. Files are independent: a
//! failure on one never stops the rest of the tree.
//!
//! Directories are created on the walker side, in walk order, before any
//! image inside them is handed to a worker. Workers only ever write files.

pub mod walk;

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::progress::{BatchSummary, FileStatus};
use crate::trim::{PageTrimmer, PipelineConfig, Result, TrimError};

pub use walk::{is_image_file, TreeWalker, TrimJob, WalkEntry, IMAGE_EXTENSIONS};

/// Default input root
pub const DEFAULT_INPUT_DIR: &str = "input";

/// Default output root
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Batch-level options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Input directory (or single image)
    pub input_root: PathBuf,
    /// Output directory
    pub output_root: PathBuf,
    /// Worker threads (None = all CPUs, 1 = sequential)
    pub threads: Option<usize>,
    /// Leave files whose output already exists untouched
    pub skip_existing: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from(DEFAULT_INPUT_DIR),
            output_root: PathBuf::from(DEFAULT_OUTPUT_DIR),
            threads: None,
            skip_existing: false,
        }
    }
}

impl BatchOptions {
    /// Effective worker count
    pub fn worker_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Trims every image under an input tree
#[derive(Debug, Clone)]
pub struct BatchTrimmer {
    config: PipelineConfig,
    options: BatchOptions,
}

impl BatchTrimmer {
    /// Create a new batch trimmer
    pub fn new(config: PipelineConfig, options: BatchOptions) -> Self {
        Self { config, options }
    }

    /// Per-page pipeline config
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Batch options
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    fn check_input(&self) -> Result<()> {
        if !self.options.input_root.exists() {
            return Err(TrimError::InputNotFound(self.options.input_root.clone()));
        }
        Ok(())
    }

    /// List what a run would do, touching nothing
    pub fn plan(&self) -> Result<Vec<WalkEntry>> {
        self.check_input()?;

        let entries = TreeWalker::new(&self.options.input_root, &self.options.output_root)
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            })
            .collect();

        Ok(entries)
    }

    /// Process the whole tree.
    ///
    /// Only a missing input root is an error here; everything else is
    /// counted in the returned summary.
    pub fn run(&self) -> Result<BatchSummary> {
        self.check_input()?;

        let mut summary = BatchSummary::default();
        let mut failed_dirs: Vec<PathBuf> = Vec::new();
        let mut blocked = 0usize;

        let walker = TreeWalker::new(&self.options.input_root, &self.options.output_root);
        let jobs = walker.filter_map(|entry| match entry {
            Ok(WalkEntry::Directory { input, output }) => {
                if failed_dirs.iter().any(|d| output.starts_with(d)) {
                    return None;
                }
                match create_output_dir(&output) {
                    Ok(()) => {
                        info!(path = %input.display(), "Processing folder");
                        summary.directories += 1;
                    }
                    Err(e) => {
                        error!(path = %input.display(), "{}", e);
                        summary.directory_failures += 1;
                        failed_dirs.push(output);
                    }
                }
                None
            }
            Ok(WalkEntry::Image(job)) => {
                if failed_dirs.iter().any(|d| job.output.starts_with(d)) {
                    error!(path = %job.input.display(), "Output directory unavailable, not processed");
                    blocked += 1;
                    None
                } else {
                    Some(job)
                }
            }
            Err(e) => {
                error!("{}", e);
                summary.traversal_errors += 1;
                None
            }
        });

        let statuses = self.dispatch(jobs);

        for status in &statuses {
            summary.record(status);
        }
        summary.images += blocked;
        summary.errors += blocked;

        info!(
            cropped = summary.cropped,
            no_content = summary.no_content,
            errors = summary.errors,
            "All done, results under {}",
            self.options.output_root.display()
        );

        Ok(summary)
    }

    /// Run jobs on the configured number of workers
    fn dispatch<I>(&self, jobs: I) -> Vec<FileStatus>
    where
        I: Iterator<Item = TrimJob> + Send,
    {
        let workers = self.options.worker_count();
        if workers == 1 {
            return jobs.map(|job| self.process(&job)).collect();
        }

        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(|| jobs.par_bridge().map(|job| self.process(&job)).collect()),
            Err(e) => {
                warn!("Thread pool unavailable ({}), processing sequentially", e);
                jobs.map(|job| self.process(&job)).collect()
            }
        }
    }

    /// Trim one image and log the result against its source path
    pub fn process(&self, job: &TrimJob) -> FileStatus {
        if self.options.skip_existing && job.output.exists() {
            debug!(path = %job.input.display(), "Output exists, skipping");
            return FileStatus::SkippedExisting;
        }

        let status = FileStatus::from_result(PageTrimmer::trim_file(
            &job.input,
            &job.output,
            &self.config,
        ));

        match &status {
            FileStatus::Cropped(outcome) => {
                let (w, h) = outcome.trimmed_size();
                debug!(
                    path = %job.input.display(),
                    "Cropped {}x{} -> {}x{}",
                    outcome.original_size.0,
                    outcome.original_size.1,
                    w,
                    h
                );
            }
            FileStatus::NoContent => {
                warn!(path = %job.input.display(), "No big blobs, skipping");
            }
            FileStatus::Failed(e) => {
                error!(path = %job.input.display(), "{}", e);
            }
            FileStatus::SkippedExisting => {}
        }

        status
    }
}

/// Idempotent `mkdir -p`
fn create_output_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| TrimError::DirectoryCreation {
        path: path.to_path_buf(),
        source,
    })
}
