//! Content-bounded page trimming
//!
//! Crops a scanned page down to the region holding its ink, artwork and text.
//!
//! # Algorithm
//!
//! 1. Global Otsu binarization, inverted so ink is foreground
//! 2. Morphological closing to merge nearby fragments into blobs
//! 3. 8-connected blob labelling
//! 4. Area filter (fraction of page area) to reject specks and watermarks
//! 5. One bounding box around every surviving blob
//! 6. Padding, clamped to the page
//! 7. Crop
//!
//! # Example
//!
//! ```rust,no_run
//! use pagetrim::{PageTrimmer, PipelineConfig};
//! use std::path::Path;
//!
//! let config = PipelineConfig::builder()
//!     .min_area_ratio(0.02)
//!     .padding(10)
//!     .build();
//!
//! let outcome = PageTrimmer::trim_file(
//!     Path::new("page.png"),
//!     Path::new("trimmed.png"),
//!     &config,
//! ).unwrap();
//!
//! println!("kept {:?}", outcome.crop);
//! ```

pub mod binarize;
pub mod blobs;
pub mod morphology;
pub mod page;
pub mod region;
mod types;

pub use blobs::{Blob, LabeledBlobs};
pub use page::{PageDetection, PageTrimmer};
pub use types::{ContentRect, Result, TrimError, TrimOutcome};

// ============================================================
// Constants
// ============================================================

/// Blobs smaller than this fraction of the page are ignored
pub const DEFAULT_MIN_AREA_RATIO: f64 = 0.01;

/// Structuring element for closing (width, height)
pub const DEFAULT_CLOSING_KERNEL: (u32, u32) = (5, 5);

/// Margin kept around the detected content, in pixels
pub const DEFAULT_PADDING: u32 = 5;

/// JPEG output quality
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

const MIN_RATIO: f64 = 0.0;
const MAX_RATIO: f64 = 1.0;
const MIN_JPEG_QUALITY: u8 = 1;
const MAX_JPEG_QUALITY: u8 = 100;

// ============================================================
// Options
// ============================================================

/// Per-page pipeline tunables
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Minimum blob area as a fraction of page area (0.0-1.0)
    pub min_area_ratio: f64,
    /// Closing structuring element (width, height)
    pub closing_kernel: (u32, u32),
    /// Padding around the content box in pixels
    pub padding: u32,
    /// Fixed binarization level (None = Otsu)
    pub threshold_override: Option<u8>,
    /// Quality for JPEG outputs (1-100)
    pub jpeg_quality: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: DEFAULT_MIN_AREA_RATIO,
            closing_kernel: DEFAULT_CLOSING_KERNEL,
            padding: DEFAULT_PADDING,
            threshold_override: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl PipelineConfig {
    /// Create a new config builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set minimum blob area ratio (0.0-1.0)
    #[must_use]
    pub fn min_area_ratio(mut self, ratio: f64) -> Self {
        self.config.min_area_ratio = if ratio.is_nan() {
            DEFAULT_MIN_AREA_RATIO
        } else {
            ratio.clamp(MIN_RATIO, MAX_RATIO)
        };
        self
    }

    /// Set closing structuring element size
    #[must_use]
    pub fn closing_kernel(mut self, width: u32, height: u32) -> Self {
        self.config.closing_kernel = (width, height);
        self
    }

    /// Set padding in pixels
    #[must_use]
    pub fn padding(mut self, padding: u32) -> Self {
        self.config.padding = padding;
        self
    }

    /// Use a fixed binarization level instead of Otsu
    #[must_use]
    pub fn threshold_override(mut self, threshold: Option<u8>) -> Self {
        self.config.threshold_override = threshold;
        self
    }

    /// Set JPEG quality (1-100)
    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY);
        self
    }

    /// Build the config
    #[must_use]
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}
