//! Per-page trimming pipeline
//!
//! decode → binarize → close → label blobs → area filter → bounding box →
//! pad/clamp → crop → encode

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::debug;

use super::binarize::{binarize, to_gray};
use super::blobs::{extract_blobs, filter_by_area};
use super::morphology::close;
use super::region::{bounding_box, crop, pad_and_clamp};
use super::types::{ContentRect, Result, TrimError, TrimOutcome};
use super::PipelineConfig;

/// What the detector found on one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageDetection {
    /// Page size (width, height)
    pub image_size: (u32, u32),
    /// Binarization level used
    pub threshold: u8,
    /// Blobs after closing
    pub blob_count: usize,
    /// Blobs that passed the area filter
    pub kept_blob_count: usize,
    /// Tight box around the kept blobs
    pub content: ContentRect,
    /// Padded, clamped crop region
    pub crop: ContentRect,
}

/// Content-bounded page trimmer
pub struct PageTrimmer;

impl PageTrimmer {
    /// Locate the crop region of a grayscale page
    pub fn detect(gray: &GrayImage, config: &PipelineConfig) -> Result<PageDetection> {
        let (width, height) = gray.dimensions();

        // Step 1: Otsu binarization, ink = foreground
        let binarized = binarize(gray, config.threshold_override);

        // Step 2: Merge fragments that sit close together
        let closed = close(&binarized.mask, config.closing_kernel);

        // Step 3: Connected ink regions
        let blobs = extract_blobs(&closed);
        let blob_count = blobs.len();

        // Step 4: Drop specks, staple holes, small watermarks
        let kept = filter_by_area(blobs, width, height, config.min_area_ratio);

        // Step 5: One box around everything that survived
        let content = bounding_box(&kept).ok_or(TrimError::NoContentFound)?;

        // Step 6: Pad and clamp to the page
        let crop = pad_and_clamp(content, width, height, config.padding);
        if !crop.is_valid() {
            return Err(TrimError::DegenerateCrop {
                width: crop.width,
                height: crop.height,
            });
        }

        Ok(PageDetection {
            image_size: (width, height),
            threshold: binarized.threshold,
            blob_count,
            kept_blob_count: kept.len(),
            content,
            crop,
        })
    }

    /// Trim an in-memory image, keeping its color type
    pub fn trim_image(
        image: &DynamicImage,
        config: &PipelineConfig,
    ) -> Result<(DynamicImage, PageDetection)> {
        let gray = to_gray(image);
        let detection = Self::detect(&gray, config)?;
        let cropped = crop(image, detection.crop)?;
        Ok((cropped, detection))
    }

    /// Decode an image file, sniffing the format from its content.
    ///
    /// The EXIF orientation is applied, so the page comes back upright.
    pub fn load(path: &Path) -> Result<DynamicImage> {
        if !path.exists() {
            return Err(TrimError::ImageNotFound(path.to_path_buf()));
        }

        let decode_err = |source| TrimError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let mut decoder = ImageReader::open(path)?
            .with_guessed_format()?
            .into_decoder()
            .map_err(decode_err)?;
        let orientation = decoder.orientation().map_err(decode_err)?;
        let mut image = DynamicImage::from_decoder(decoder).map_err(decode_err)?;
        image.apply_orientation(orientation);

        Ok(image)
    }

    /// Trim `input` and write the crop to `output`.
    ///
    /// Nothing is written when the page has no significant content.
    pub fn trim_file(input: &Path, output: &Path, config: &PipelineConfig) -> Result<TrimOutcome> {
        let image = Self::load(input)?;
        let (cropped, detection) = Self::trim_image(&image, config)?;

        debug!(
            path = %input.display(),
            threshold = detection.threshold,
            blobs = detection.blob_count,
            kept = detection.kept_blob_count,
            "content at {:?}",
            detection.content
        );

        Self::save(&cropped, output, config.jpeg_quality)?;

        Ok(TrimOutcome {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            original_size: detection.image_size,
            crop: detection.crop,
            threshold: detection.threshold,
            blob_count: detection.blob_count,
            kept_blob_count: detection.kept_blob_count,
        })
    }

    /// Encode `image` in the format implied by `output`'s extension.
    ///
    /// The file only appears at `output` once encoding succeeded.
    pub fn save(image: &DynamicImage, output: &Path, jpeg_quality: u8) -> Result<()> {
        let encode_err = |source| TrimError::Encode {
            path: output.to_path_buf(),
            source,
        };

        let format = ImageFormat::from_path(output).map_err(encode_err)?;
        let mut buffer = Cursor::new(Vec::new());

        if format == ImageFormat::Jpeg {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality);
            let encodable = match image {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image.clone(),
                DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLuma16(_) => {
                    DynamicImage::ImageLuma8(image.to_luma8())
                }
                _ => DynamicImage::ImageRgb8(image.to_rgb8()),
            };
            encodable.write_with_encoder(encoder).map_err(encode_err)?;
        } else {
            image.write_to(&mut buffer, format).map_err(encode_err)?;
        }

        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(buffer.get_ref())?;
        staged.persist(output).map_err(|e| TrimError::IoError(e.error))?;

        Ok(())
    }
}
