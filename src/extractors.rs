//! Interchangeable object extractors
//!
//! [`Segmenter`] is the k-means pipeline; [`OtsuThresholdExtractor`] is a
//! simpler path built on `imageproc` that binarises dark objects with a
//! global Otsu level and reports their union as one region.

use image::{GrayImage, Luma, RgbaImage};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;

use crate::errors::{Result, SegmentationError};
use crate::labeling::{remove_small_regions, Region};
use crate::mask::Mask;
use crate::morphology::morphological_gradient;
use crate::render::{PngRasterEncoder, RasterEncoder, RenderConfig};
use crate::segmentation::{encode_result, ObjectExtraction, SegmentationResult, Segmenter};

/// Anything that turns an image into a [`SegmentationResult`]
pub trait ObjectExtractor {
    /// Short identifier used in logs and summaries
    fn name(&self) -> &'static str;

    fn extract(&self, image: &RgbaImage, min_region_size: u32) -> Result<SegmentationResult>;
}

impl<E: RasterEncoder> ObjectExtractor for Segmenter<E> {
    fn name(&self) -> &'static str {
        "kmeans"
    }

    fn extract(&self, image: &RgbaImage, min_region_size: u32) -> Result<SegmentationResult> {
        self.segment(image, min_region_size)
    }
}

/// Radius of the L-infinity opening applied to the binary image
const OPEN_RADIUS: u8 = 2;

/// Global Otsu binarisation with a square opening
#[derive(Debug, Clone)]
pub struct OtsuThresholdExtractor<E: RasterEncoder = PngRasterEncoder> {
    pub render: RenderConfig,
    encoder: E,
}

impl Default for OtsuThresholdExtractor<PngRasterEncoder> {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl OtsuThresholdExtractor<PngRasterEncoder> {
    pub fn new(render: RenderConfig) -> Self {
        Self::with_encoder(render, PngRasterEncoder)
    }
}

impl<E: RasterEncoder> OtsuThresholdExtractor<E> {
    pub fn with_encoder(render: RenderConfig, encoder: E) -> Self {
        Self { render, encoder }
    }

    /// Binary object mask and the Otsu level it was cut at
    pub fn extract_objects(&self, image: &RgbaImage, min_region_size: u32) -> Result<ObjectExtraction> {
        let (width, height) = image.dimensions();
        if width <= 1 || height <= 1 {
            return Err(SegmentationError::InputTooSmall { width, height });
        }

        let gray = image::imageops::grayscale(image);
        let level = otsu_level(&gray);
        log::debug!("Otsu level (imageproc): {}", level);

        let binary = GrayImage::from_fn(width, height, |x, y| {
            if gray.get_pixel(x, y)[0] <= level {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        let opened = imageproc::morphology::open(&binary, Norm::LInf, OPEN_RADIUS);

        let raw = Mask::from_vec(
            width,
            height,
            opened.pixels().map(|p| p[0] > 0).collect(),
        );
        let mask = remove_small_regions(&raw, min_region_size as usize);

        let area = mask.count();
        if area == 0 {
            log::warn!("Otsu extractor found no object pixels");
            return Err(SegmentationError::NoObjectsFound);
        }

        let edges = morphological_gradient(&mask);
        let area_percent = 100.0 * area as f64 / mask.len() as f64;

        Ok(ObjectExtraction {
            mask,
            edges,
            threshold: level,
            regions: vec![Region {
                id: 1,
                area_px: area,
                area_percent,
            }],
        })
    }
}

impl<E: RasterEncoder> ObjectExtractor for OtsuThresholdExtractor<E> {
    fn name(&self) -> &'static str {
        "otsu"
    }

    fn extract(&self, image: &RgbaImage, min_region_size: u32) -> Result<SegmentationResult> {
        let extraction = self.extract_objects(image, min_region_size)?;
        encode_result(image, extraction, &self.render, &self.encoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use image::Rgba;

    fn dark_square_on_white(size: u32, x0: u32, y0: u32, side: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            if x >= x0 && x < x0 + side && y >= y0 && y < y0 + side {
                Rgba([20, 20, 20, 255])
            } else {
                Rgba([235, 235, 235, 255])
            }
        })
    }

    #[test]
    fn finds_dark_square_as_single_region() {
        let image = dark_square_on_white(80, 10, 10, 30);
        let extractor = OtsuThresholdExtractor::default();

        let result = extractor.extract(&image, 10).expect("extract");
        assert_eq!(result.segment_count, 1);
        assert_eq!(result.areas_px, vec![900]);
        assert_approx_eq!(result.areas_percent[0], 900.0 / 64.0, 1e-9);
        assert_eq!(extractor.name(), "otsu");
    }

    #[test]
    fn opening_removes_thin_dark_lines() {
        let mut image = dark_square_on_white(80, 40, 40, 20);
        for x in 0..30 {
            image.put_pixel(x, 5, Rgba([20, 20, 20, 255]));
        }

        let extraction = OtsuThresholdExtractor::default()
            .extract_objects(&image, 10)
            .expect("extract");
        assert_eq!(extraction.mask.count(), 400);
        assert!(!extraction.mask.get(10, 5));
    }

    #[test]
    fn uniform_bright_image_after_opening_is_empty() {
        // Only a speck is darker than the Otsu level; the opening removes it
        let mut image = RgbaImage::from_pixel(60, 60, Rgba([240, 240, 240, 255]));
        image.put_pixel(30, 30, Rgba([0, 0, 0, 255]));

        let result = OtsuThresholdExtractor::default().extract(&image, 10);
        assert!(matches!(result, Err(SegmentationError::NoObjectsFound)));
    }

    #[test]
    fn kmeans_segmenter_is_an_extractor() {
        let extractors: Vec<Box<dyn ObjectExtractor>> = vec![
            Box::new(Segmenter::default()),
            Box::new(OtsuThresholdExtractor::default()),
        ];
        let names: Vec<_> = extractors.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["kmeans", "otsu"]);
    }
}
