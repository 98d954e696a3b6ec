//! Crop region: aggregation, padding and extraction

use image::DynamicImage;

use super::blobs::Blob;
use super::types::{ContentRect, Result, TrimError};

/// Minimal rectangle covering every pixel of every blob.
///
/// Disjoint blobs are merged into one box spanning all of them. Returns
/// `None` for an empty slice.
pub fn bounding_box(blobs: &[Blob]) -> Option<ContentRect> {
    let first = blobs.first()?.extent;

    let (mut min_x, mut min_y) = (first.x, first.y);
    let (mut max_x, mut max_y) = (first.right() - 1, first.bottom() - 1);

    for blob in &blobs[1..] {
        let e = blob.extent;
        min_x = min_x.min(e.x);
        min_y = min_y.min(e.y);
        max_x = max_x.max(e.right() - 1);
        max_y = max_y.max(e.bottom() - 1);
    }

    Some(ContentRect::from_extent(min_x, min_y, max_x, max_y))
}

/// Grow a rectangle by `padding` on every side and clamp it to the page.
pub fn pad_and_clamp(rect: ContentRect, width: u32, height: u32, padding: u32) -> ContentRect {
    let x1 = rect.x.saturating_sub(padding).min(width);
    let y1 = rect.y.saturating_sub(padding).min(height);
    let x2 = rect.right().saturating_add(padding).min(width);
    let y2 = rect.bottom().saturating_add(padding).min(height);

    ContentRect {
        x: x1,
        y: y1,
        width: x2.saturating_sub(x1),
        height: y2.saturating_sub(y1),
    }
}

/// Copy the pixels inside `rect` into a new image of the same color type.
pub fn crop(image: &DynamicImage, rect: ContentRect) -> Result<DynamicImage> {
    if !rect.is_valid() || !rect.fits_within(image.width(), image.height()) {
        return Err(TrimError::DegenerateCrop {
            width: rect.width,
            height: rect.height,
        });
    }

    Ok(image.crop_imm(rect.x, rect.y, rect.width, rect.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn blob(x: u32, y: u32, width: u32, height: u32) -> Blob {
        Blob {
            label: 1,
            pixel_count: (width * height) as u64,
            area: (width * height) as u64,
            extent: ContentRect {
                x,
                y,
                width,
                height,
            },
        }
    }

    #[test]
    fn test_bounding_box_empty() {
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn test_bounding_box_single() {
        let rect = bounding_box(&[blob(400, 400, 200, 100)]).unwrap();
        assert_eq!(
            rect,
            ContentRect {
                x: 400,
                y: 400,
                width: 200,
                height: 100
            }
        );
    }

    #[test]
    fn test_bounding_box_spans_disjoint_blobs() {
        let rect = bounding_box(&[blob(50, 50, 100, 100), blob(800, 800, 100, 100)]).unwrap();
        assert_eq!(rect.x, 50);
        assert_eq!(rect.y, 50);
        assert_eq!(rect.right(), 900);
        assert_eq!(rect.bottom(), 900);
    }

    #[test]
    fn test_bounding_box_covers_every_extent() {
        let blobs = vec![blob(10, 80, 5, 5), blob(60, 3, 20, 2), blob(30, 30, 1, 90)];
        let rect = bounding_box(&blobs).unwrap();

        for b in &blobs {
            let e = b.extent;
            assert!(rect.contains(e.x, e.y));
            assert!(rect.contains(e.right() - 1, e.bottom() - 1));
        }
        assert_eq!(rect, ContentRect::from_extent(10, 3, 79, 119));
    }

    #[test]
    fn test_pad_and_clamp_interior() {
        let rect = ContentRect {
            x: 400,
            y: 400,
            width: 200,
            height: 100,
        };
        let padded = pad_and_clamp(rect, 1000, 1000, 5);
        assert_eq!(
            padded,
            ContentRect {
                x: 395,
                y: 395,
                width: 210,
                height: 110
            }
        );
    }

    #[test]
    fn test_pad_and_clamp_touching_edges() {
        let rect = ContentRect {
            x: 0,
            y: 2,
            width: 100,
            height: 48,
        };
        let padded = pad_and_clamp(rect, 100, 50, 5);
        assert_eq!(
            padded,
            ContentRect {
                x: 0,
                y: 0,
                width: 100,
                height: 50
            }
        );
    }

    #[test]
    fn test_pad_and_clamp_stays_in_bounds() {
        let (w, h) = (37u32, 23u32);
        for padding in [0u32, 1, 5, 40, u32::MAX] {
            for x in (0..w).step_by(6) {
                for y in (0..h).step_by(5) {
                    let rect = ContentRect {
                        x,
                        y,
                        width: w - x,
                        height: h - y,
                    };
                    let out = pad_and_clamp(rect, w, h, padding);
                    assert!(out.fits_within(w, h), "{:?} padding {}", out, padding);
                    assert!(out.x <= x && out.y <= y);
                }
            }
        }
    }

    #[test]
    fn test_pad_and_clamp_zero_padding_is_identity() {
        let rect = ContentRect {
            x: 3,
            y: 4,
            width: 5,
            height: 6,
        };
        assert_eq!(pad_and_clamp(rect, 100, 100, 0), rect);
    }

    #[test]
    fn test_crop_gray_pixels() {
        let gray = GrayImage::from_fn(10, 10, |x, y| Luma([(y * 10 + x) as u8]));
        let image = DynamicImage::ImageLuma8(gray);
        let rect = ContentRect {
            x: 2,
            y: 3,
            width: 4,
            height: 2,
        };

        let cropped = crop(&image, rect).unwrap();
        assert_eq!(cropped.width(), 4);
        assert_eq!(cropped.height(), 2);
        let luma = cropped.to_luma8();
        assert_eq!(luma.get_pixel(0, 0).0[0], 32);
        assert_eq!(luma.get_pixel(3, 1).0[0], 45);
    }

    #[test]
    fn test_crop_keeps_color_type() {
        let rgb = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let image = DynamicImage::ImageRgb8(rgb);
        let cropped = crop(
            &image,
            ContentRect {
                x: 1,
                y: 1,
                width: 3,
                height: 3,
            },
        )
        .unwrap();

        assert!(matches!(cropped, DynamicImage::ImageRgb8(_)));
        assert_eq!(cropped.to_rgb8().get_pixel(2, 2).0, [10, 20, 30]);
    }

    #[test]
    fn test_crop_rejects_degenerate_box() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(10, 10));
        let empty = ContentRect {
            x: 5,
            y: 5,
            width: 0,
            height: 3,
        };
        assert!(matches!(
            crop(&image, empty),
            Err(TrimError::DegenerateCrop {
                width: 0,
                height: 3
            })
        ));
    }

    #[test]
    fn test_crop_rejects_out_of_bounds_box() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(10, 10));
        let rect = ContentRect {
            x: 5,
            y: 5,
            width: 6,
            height: 2,
        };
        assert!(crop(&image, rect).unwrap_err().is_no_content());
    }
}
