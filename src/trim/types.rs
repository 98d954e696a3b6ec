//! Common types for the trim module

use std::path::PathBuf;
use thiserror::Error;

/// Trim error types
#[derive(Debug, Error)]
pub enum TrimError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Input path not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Invalid image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("No significant content found")]
    NoContentFound,

    #[error("Degenerate crop region ({width}x{height})")]
    DegenerateCrop { width: u32, height: u32 },

    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TrimError {
    /// True for the "nothing worth keeping on this page" outcomes, which are
    /// reported as warnings rather than errors.
    pub fn is_no_content(&self) -> bool {
        matches!(
            self,
            TrimError::NoContentFound | TrimError::DegenerateCrop { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TrimError>;

/// Axis-aligned rectangle in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ContentRect {
    /// Build a rectangle from inclusive corner coordinates
    pub fn from_extent(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Check if the rectangle has non-zero area
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Check whether the pixel at (x, y) lies inside the rectangle
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check whether the rectangle lies fully within a width x height image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

/// Result of trimming a single page
#[derive(Debug, Clone)]
pub struct TrimOutcome {
    /// Source image path
    pub input_path: PathBuf,
    /// Written crop path
    pub output_path: PathBuf,
    /// Original image size (width, height)
    pub original_size: (u32, u32),
    /// Region that was kept
    pub crop: ContentRect,
    /// Binarization level actually used
    pub threshold: u8,
    /// Blobs found after closing
    pub blob_count: usize,
    /// Blobs that passed the area filter
    pub kept_blob_count: usize,
}

impl TrimOutcome {
    /// Size of the written crop (width, height)
    pub fn trimmed_size(&self) -> (u32, u32) {
        (self.crop.width, self.crop.height)
    }
}
