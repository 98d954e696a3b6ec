//! Batch outcome tracking and the end-of-run summary.

use std::fmt;

use crate::trim::{TrimError, TrimOutcome};

/// Summary rule width in characters
const SUMMARY_WIDTH: usize = 60;

/// What happened to a single image
#[derive(Debug)]
pub enum FileStatus {
    /// Crop written
    Cropped(TrimOutcome),
    /// No significant content; nothing written
    NoContent,
    /// Output already present and `skip_existing` set
    SkippedExisting,
    /// Decode, encode or IO failure
    Failed(TrimError),
}

impl FileStatus {
    /// Classify a per-file pipeline result
    pub fn from_result(result: crate::trim::Result<TrimOutcome>) -> Self {
        match result {
            Ok(outcome) => FileStatus::Cropped(outcome),
            Err(e) if e.is_no_content() => FileStatus::NoContent,
            Err(e) => FileStatus::Failed(e),
        }
    }
}

/// Counters for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Output directories created (or already present)
    pub directories: usize,
    /// Output directories that could not be created
    pub directory_failures: usize,
    /// Images seen
    pub images: usize,
    /// Crops written
    pub cropped: usize,
    /// Images skipped for lack of content
    pub no_content: usize,
    /// Images skipped because their output existed
    pub skipped_existing: usize,
    /// Images that failed (including those under an uncreatable directory)
    pub errors: usize,
    /// Directories that could not be read
    pub traversal_errors: usize,
}

impl BatchSummary {
    /// Fold one file status into the counters
    pub fn record(&mut self, status: &FileStatus) {
        self.images += 1;
        match status {
            FileStatus::Cropped(_) => self.cropped += 1,
            FileStatus::NoContent => self.no_content += 1,
            FileStatus::SkippedExisting => self.skipped_existing += 1,
            FileStatus::Failed(_) => self.errors += 1,
        }
    }

    /// True if any output may have been lost to a filesystem failure
    pub fn has_fatal_errors(&self) -> bool {
        self.directory_failures > 0
    }

    /// Print the summary block to stdout
    pub fn print(&self) {
        println!();
        println!("{}", self);
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(SUMMARY_WIDTH);
        writeln!(f, "{}", rule)?;
        writeln!(f, "Trim Summary")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "  Directories:  {}", self.directories)?;
        writeln!(f, "  Images:       {}", self.images)?;
        writeln!(f, "  Cropped:      {}", self.cropped)?;
        writeln!(f, "  No content:   {}", self.no_content)?;
        writeln!(f, "  Skipped:      {}", self.skipped_existing)?;
        writeln!(f, "  Errors:       {}", self.errors)?;
        if self.directory_failures > 0 || self.traversal_errors > 0 {
            writeln!(f, "  Dir failures: {}", self.directory_failures)?;
            writeln!(f, "  Unreadable:   {}", self.traversal_errors)?;
        }
        write!(f, "{}", rule)
    }
}
