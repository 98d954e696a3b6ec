//! Blob extraction and area filtering
//!
//! Blobs are 8-connected ink components. A blob's area is the area enclosed
//! by its outer boundary: its own pixels plus any holes inside it, so a thin
//! panel frame counts with the full panel it surrounds.
//!
//! Holes are 4-connected paper components that do not touch the page edge.
//! With 8-connected ink and 4-connected paper every hole is surrounded by
//! exactly one blob, which owns the ink pixel directly above the hole's first
//! pixel in raster order. All areas come out of a single labeling pass over
//! the page.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::VecDeque;

use super::binarize::{INK, PAPER};
use super::types::ContentRect;

/// 8-connected neighborhood
const NEIGHBORS_8: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A connected ink region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Label in the owning [`LabeledBlobs`] map (1-based)
    pub label: u32,
    /// Number of ink pixels in the blob
    pub pixel_count: u64,
    /// Pixels enclosed by the outer boundary (ink + holes)
    pub area: u64,
    /// Inclusive extent of the blob's pixels
    pub extent: ContentRect,
}

/// Label map produced by [`label_blobs`]
#[derive(Debug, Clone)]
pub struct LabeledBlobs {
    pub width: u32,
    pub height: u32,
    /// Row-major labels, 0 for paper
    pub labels: Vec<u32>,
    /// Blobs in raster discovery order; `blobs[i].label == i + 1`
    pub blobs: Vec<Blob>,
}

/// Extract all blobs from an ink mask.
pub fn extract_blobs(mask: &GrayImage) -> Vec<Blob> {
    label_blobs(mask).blobs
}

/// Label every 8-connected ink component of a mask.
pub fn label_blobs(mask: &GrayImage) -> LabeledBlobs {
    let (width, height) = mask.dimensions();
    let mut labels = vec![0u32; (width as usize) * (height as usize)];
    let mut blobs = Vec::new();
    // First pixel of each blob in raster order
    let mut seeds = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            if labels[idx] == 0 && mask.get_pixel(x, y).0[0] > 0 {
                let label = blobs.len() as u32 + 1;
                let (pixel_count, extent) = flood_fill(mask, x, y, label, &mut labels);
                blobs.push(Blob {
                    label,
                    pixel_count,
                    area: pixel_count,
                    extent,
                });
                seeds.push((x, y));
            }
        }
    }

    let mut labeled = LabeledBlobs {
        width,
        height,
        labels,
        blobs,
    };
    labeled.fill_enclosed_areas(mask, &seeds);
    labeled
}

/// Flood-fill a single component, writing `label` into the map
fn flood_fill(
    mask: &GrayImage,
    start_x: u32,
    start_y: u32,
    label: u32,
    labels: &mut [u32],
) -> (u64, ContentRect) {
    let (width, height) = mask.dimensions();
    let mut queue = VecDeque::new();
    queue.push_back((start_x, start_y));
    labels[(start_y * width + start_x) as usize] = label;

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (start_x, start_y, start_x, start_y);
    let mut count = 0u64;

    while let Some((x, y)) = queue.pop_front() {
        count += 1;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);

        for (dx, dy) in &NEIGHBORS_8 {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            let idx = (ny * width + nx) as usize;
            if labels[idx] == 0 && mask.get_pixel(nx, ny).0[0] > 0 {
                labels[idx] = label;
                queue.push_back((nx, ny));
            }
        }
    }

    (count, ContentRect::from_extent(min_x, min_y, max_x, max_y))
}

/// A 4-connected paper component
#[derive(Debug, Clone, Copy, Default)]
struct PaperRegion {
    size: u64,
    first: Option<(u32, u32)>,
    touches_edge: bool,
}

impl LabeledBlobs {
    /// Label of the pixel at (x, y), 0 for paper
    pub fn label_at(&self, x: u32, y: u32) -> u32 {
        self.labels[(y * self.width + x) as usize]
    }

    /// Add holes, and whatever sits inside them, to each blob's area.
    ///
    /// `seeds[i]` is the first raster pixel of `blobs[i]`. A blob nested in
    /// a hole is always discovered after the blob owning that hole.
    fn fill_enclosed_areas(&mut self, mask: &GrayImage, seeds: &[(u32, u32)]) {
        if self.blobs.is_empty() {
            return;
        }
        let (width, height) = (self.width, self.height);

        // Paper is labeled as foreground, ink as background
        let paper_mask = GrayImage::from_fn(width, height, |x, y| {
            if mask.get_pixel(x, y).0[0] > 0 {
                Luma([INK])
            } else {
                Luma([PAPER])
            }
        });
        let paper = connected_components(&paper_mask, Connectivity::Four, Luma([INK]));

        let region_count = paper.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;
        let mut regions = vec![PaperRegion::default(); region_count + 1];
        for (x, y, p) in paper.enumerate_pixels() {
            let label = p.0[0] as usize;
            if label == 0 {
                continue;
            }
            let region = &mut regions[label];
            region.size += 1;
            region.first.get_or_insert((x, y));
            if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                region.touches_edge = true;
            }
        }

        // Blob label owning each hole, 0 for the outside
        let owner_of = |region: &PaperRegion| -> u32 {
            match region.first {
                Some((x, y)) if !region.touches_edge && y > 0 => self.label_at(x, y - 1),
                _ => 0,
            }
        };

        let mut areas: Vec<u64> = self.blobs.iter().map(|b| b.pixel_count).collect();
        for region in regions.iter().skip(1) {
            let owner = owner_of(region);
            if owner > 0 {
                areas[owner as usize - 1] += region.size;
            }
        }

        // Blob directly inside a hole: the paper above its first pixel
        let parents: Vec<u32> = seeds
            .iter()
            .map(|&(x, y)| {
                if y == 0 {
                    return 0;
                }
                let label = paper.get_pixel(x, y - 1).0[0] as usize;
                if label == 0 {
                    0
                } else {
                    owner_of(&regions[label])
                }
            })
            .collect();

        // Children have higher labels than their parents
        for i in (0..areas.len()).rev() {
            let parent = parents[i] as usize;
            if parent > 0 && parent - 1 < i {
                areas[parent - 1] += areas[i];
            }
        }

        for (blob, area) in self.blobs.iter_mut().zip(areas) {
            blob.area = area;
        }
    }
}

/// Minimum blob area for a page of the given size
pub fn min_blob_area(width: u32, height: u32, min_area_ratio: f64) -> f64 {
    min_area_ratio * (width as f64 * height as f64)
}

/// Keep blobs whose enclosed area is at least `min_area_ratio` of the page.
///
/// An empty result means the page has no significant content.
pub fn filter_by_area(blobs: Vec<Blob>, width: u32, height: u32, min_area_ratio: f64) -> Vec<Blob> {
    let min_area = min_blob_area(width, height, min_area_ratio);
    blobs
        .into_iter()
        .filter(|b| b.area as f64 >= min_area)
        .collect()
}
