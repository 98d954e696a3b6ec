//! Global Otsu binarization
//!
//! Ink is dark and paper is light, so the mask is inverted relative to raw
//! intensity: pixels in the dark Otsu class become foreground (255).

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;

/// Mask value for ink
pub const INK: u8 = 255;

/// Mask value for paper
pub const PAPER: u8 = 0;

/// Fixed-point BT.601 luma weights (0.299, 0.587, 0.114) scaled by 2^14
const LUMA_WEIGHTS: [u32; 3] = [4899, 9617, 1868];

/// Convert a page to grayscale with BT.601 weights.
///
/// Grayscale inputs keep their values; color inputs drop alpha.
pub fn to_gray(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => image.to_luma8(),
        _ => {
            let rgb = image.to_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                let weighted = r as u32 * LUMA_WEIGHTS[0]
                    + g as u32 * LUMA_WEIGHTS[1]
                    + b as u32 * LUMA_WEIGHTS[2];
                Luma([((weighted + (1 << 13)) >> 14) as u8])
            })
        }
    }
}

/// Binarized page plus the level that produced it
#[derive(Debug, Clone)]
pub struct Binarized {
    pub mask: GrayImage,
    pub threshold: u8,
}

/// Compute the Otsu level of a grayscale image.
///
/// Pixels with intensity `<= level` form the dark class.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    otsu_level(gray)
}

/// Binarize a grayscale page into an ink mask.
///
/// `threshold_override` replaces the automatic Otsu level. A page with a
/// single intensity has no foreground/background split and yields an
/// all-paper mask.
pub fn binarize(gray: &GrayImage, threshold_override: Option<u8>) -> Binarized {
    let threshold = threshold_override.unwrap_or_else(|| otsu_threshold(gray));

    if threshold_override.is_none() && is_uniform(gray) {
        let (width, height) = gray.dimensions();
        return Binarized {
            mask: GrayImage::from_pixel(width, height, Luma([PAPER])),
            threshold,
        };
    }

    let mask = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] <= threshold {
            Luma([INK])
        } else {
            Luma([PAPER])
        }
    });

    Binarized { mask, threshold }
}

fn is_uniform(gray: &GrayImage) -> bool {
    let mut pixels = gray.pixels();
    match pixels.next() {
        Some(first) => pixels.all(|p| p.0[0] == first.0[0]),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_to_gray_uses_bt601_weights() {
        let mut rgb = RgbImage::new(4, 1);
        rgb.put_pixel(0, 0, Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, Rgb([0, 255, 0]));
        rgb.put_pixel(2, 0, Rgb([0, 0, 255]));
        rgb.put_pixel(3, 0, Rgb([255, 255, 255]));

        let gray = to_gray(&DynamicImage::ImageRgb8(rgb));

        assert_eq!(gray.get_pixel(0, 0).0[0], 76);
        assert_eq!(gray.get_pixel(1, 0).0[0], 150);
        assert_eq!(gray.get_pixel(2, 0).0[0], 29);
        assert_eq!(gray.get_pixel(3, 0).0[0], 255);
    }

    #[test]
    fn test_to_gray_keeps_gray_values() {
        let gray = GrayImage::from_fn(3, 3, |x, y| Luma([(x * 40 + y) as u8]));
        assert_eq!(to_gray(&DynamicImage::ImageLuma8(gray.clone())), gray);
    }

    fn page_with_block(value: u8) -> GrayImage {
        let mut gray = GrayImage::from_pixel(40, 40, Luma([250]));
        for y in 10..20 {
            for x in 10..30 {
                gray.put_pixel(x, y, Luma([value]));
            }
        }
        gray
    }

    #[test]
    fn test_dark_block_becomes_ink() {
        let result = binarize(&page_with_block(20), None);

        assert_eq!(result.mask.get_pixel(15, 15).0[0], INK);
        assert_eq!(result.mask.get_pixel(0, 0).0[0], PAPER);
        assert!(result.threshold >= 20 && result.threshold < 250);
    }

    #[test]
    fn test_mask_keeps_dimensions() {
        let gray = page_with_block(0);
        let result = binarize(&gray, None);
        assert_eq!(result.mask.dimensions(), gray.dimensions());
    }

    #[test]
    fn test_white_page_has_no_ink() {
        let gray = GrayImage::from_pixel(32, 32, Luma([255]));
        let result = binarize(&gray, None);
        assert!(result.mask.pixels().all(|p| p.0[0] == PAPER));
    }

    #[test]
    fn test_black_page_has_no_ink() {
        let gray = GrayImage::from_pixel(32, 32, Luma([0]));
        let result = binarize(&gray, None);
        assert!(result.mask.pixels().all(|p| p.0[0] == PAPER));
    }

    #[test]
    fn test_threshold_override() {
        let gray = page_with_block(120);

        // Level below the block keeps it as paper
        let low = binarize(&gray, Some(100));
        assert_eq!(low.threshold, 100);
        assert_eq!(low.mask.get_pixel(15, 15).0[0], PAPER);

        // Level at the block intensity marks it as ink
        let high = binarize(&gray, Some(120));
        assert_eq!(high.mask.get_pixel(15, 15).0[0], INK);
        assert_eq!(high.mask.get_pixel(0, 0).0[0], PAPER);
    }

    #[test]
    fn test_otsu_separates_two_levels() {
        let gray = page_with_block(40);
        let level = otsu_threshold(&gray);
        assert!(level >= 40);
        assert!(level < 250);
    }

    #[test]
    fn test_binarize_is_deterministic() {
        let gray = page_with_block(60);
        let a = binarize(&gray, None);
        let b = binarize(&gray, None);
        assert_eq!(a.threshold, b.threshold);
        assert_eq!(a.mask.as_raw(), b.mask.as_raw());
    }
}
