//! Trim pipeline integration tests
//!
//! Page scenarios on synthetic scans plus whole-tree batch runs.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use pagetrim::{
    BatchOptions, BatchTrimmer, ContentRect, PageTrimmer, PipelineConfig, TrimError,
};
use std::fs;
use std::path::Path;

fn page(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> GrayImage {
    let mut gray = GrayImage::from_pixel(width, height, Luma([255]));
    for &(x0, y0, w, h) in rects {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                gray.put_pixel(x, y, Luma([0]));
            }
        }
    }
    gray
}

fn save_page(path: &Path, gray: &GrayImage) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    gray.save(path).unwrap();
}

// TC-TRIM-001: single rectangle on a white page
#[test]
fn test_single_rectangle_scenario() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("page.png");
    let output = temp.path().join("trimmed.png");
    save_page(&input, &page(1000, 1000, &[(400, 400, 200, 100)]));

    let outcome = PageTrimmer::trim_file(&input, &output, &PipelineConfig::default()).unwrap();

    assert_eq!(
        outcome.crop,
        ContentRect {
            x: 395,
            y: 395,
            width: 210,
            height: 110
        }
    );
    let written = image::open(&output).unwrap().to_luma8();
    assert_eq!(written.dimensions(), (210, 110));
    // Padding is paper, the interior is ink
    assert_eq!(written.get_pixel(0, 0).0[0], 255);
    assert_eq!(written.get_pixel(5, 5).0[0], 0);
    assert_eq!(written.get_pixel(204, 104).0[0], 0);
    assert_eq!(written.get_pixel(205, 105).0[0], 255);
}

// TC-TRIM-002: a 5x5 speck is below the area threshold
#[test]
fn test_speck_scenario_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("speck.png");
    let output = temp.path().join("out.png");
    save_page(&input, &page(1000, 1000, &[(400, 400, 5, 5)]));

    let result = PageTrimmer::trim_file(&input, &output, &PipelineConfig::default());

    assert!(matches!(result, Err(TrimError::NoContentFound)));
    assert!(!output.exists());
}

// TC-TRIM-003: two distant squares produce one spanning crop
#[test]
fn test_two_squares_scenario() {
    let gray = page(1000, 1000, &[(50, 50, 100, 100), (800, 800, 100, 100)]);
    let image = DynamicImage::ImageLuma8(gray);

    let (cropped, detection) = PageTrimmer::trim_image(&image, &PipelineConfig::default()).unwrap();

    assert_eq!(
        detection.crop,
        ContentRect {
            x: 45,
            y: 45,
            width: 860,
            height: 860
        }
    );
    assert_eq!((cropped.width(), cropped.height()), (860, 860));
}

#[test]
fn test_larger_padding_clamps_at_page_edge() {
    let gray = page(300, 300, &[(10, 200, 280, 95)]);
    let config = PipelineConfig::builder().padding(50).build();

    let detection = PageTrimmer::detect(&gray, &config).unwrap();

    assert_eq!(detection.crop.x, 0);
    assert_eq!(detection.crop.y, 150);
    assert_eq!(detection.crop.right(), 300);
    assert_eq!(detection.crop.bottom(), 300);
}

#[test]
fn test_noisy_scan_ignores_dust() {
    let mut gray = page(600, 800, &[(100, 150, 400, 500)]);
    // Scattered dust and a staple hole in the margins
    for &(x, y) in &[(10, 10), (590, 20), (30, 780), (580, 790), (300, 60)] {
        gray.put_pixel(x, y, Luma([0]));
    }
    for y in 700..706 {
        for x in 20..26 {
            gray.put_pixel(x, y, Luma([10]));
        }
    }

    let detection = PageTrimmer::detect(&gray, &PipelineConfig::default()).unwrap();

    assert_eq!(detection.content, ContentRect::from_extent(100, 150, 499, 649));
}

#[test]
fn test_color_jpeg_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("color.JPG");
    let output = temp.path().join("out.jpg");

    let mut rgb = RgbImage::from_pixel(400, 300, Rgb([245, 240, 230]));
    for y in 100..200 {
        for x in 50..350 {
            rgb.put_pixel(x, y, Rgb([20, 30, 120]));
        }
    }
    DynamicImage::ImageRgb8(rgb).save(&input).unwrap();

    let outcome = PageTrimmer::trim_file(&input, &output, &PipelineConfig::default()).unwrap();

    // JPEG artifacts may blur the edges by a pixel or two
    let (w, h) = outcome.trimmed_size();
    assert!((305..=315).contains(&w), "width {}", w);
    assert!((105..=115).contains(&h), "height {}", h);
    let written = image::open(&output).unwrap();
    assert_eq!((written.width(), written.height()), (w, h));
}

#[test]
fn test_trim_twice_is_byte_identical() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("page.png");
    save_page(&input, &page(500, 700, &[(60, 80, 300, 400), (100, 600, 50, 50)]));

    let config = PipelineConfig::default();
    let a = temp.path().join("a.png");
    let b = temp.path().join("b.png");
    PageTrimmer::trim_file(&input, &a, &config).unwrap();
    PageTrimmer::trim_file(&input, &b, &config).unwrap();

    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn test_batch_tree_mirroring() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("input");
    let output = temp.path().join("output");

    save_page(&input.join("cover.png"), &page(300, 400, &[(50, 50, 200, 300)]));
    save_page(&input.join("vol1/001.png"), &page(300, 400, &[(20, 30, 100, 100)]));
    save_page(&input.join("vol1/002.PNG"), &page(300, 400, &[]));
    save_page(&input.join("vol2/ch1/003.png"), &page(300, 400, &[(0, 0, 300, 40)]));
    fs::create_dir_all(input.join("empty")).unwrap();
    fs::write(input.join("vol1/Thumbs.db"), b"junk").unwrap();

    let options = BatchOptions {
        input_root: input.clone(),
        output_root: output.clone(),
        threads: Some(2),
        skip_existing: false,
    };
    let summary = BatchTrimmer::new(PipelineConfig::default(), options)
        .run()
        .unwrap();

    assert_eq!(summary.directories, 5);
    assert_eq!(summary.images, 4);
    assert_eq!(summary.cropped, 3);
    assert_eq!(summary.no_content, 1);
    assert_eq!(summary.errors, 0);

    for dir in ["", "vol1", "vol2", "vol2/ch1", "empty"] {
        assert!(output.join(dir).is_dir(), "missing {}", dir);
    }
    assert!(output.join("cover.png").is_file());
    assert!(output.join("vol1/001.png").is_file());
    assert!(!output.join("vol1/002.PNG").exists());
    assert!(!output.join("vol1/Thumbs.db").exists());

    let band = image::open(output.join("vol2/ch1/003.png")).unwrap();
    assert_eq!((band.width(), band.height()), (300, 45));
}
