// src/segmentation.rs - End-to-end object extraction for a single image

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::clustering::{background_cluster, cluster_count, KMeans};
use crate::color::extract_features;
use crate::errors::{Result, SegmentationError};
use crate::hole_filling::fill_holes;
use crate::labeling::{label_components, min_keep, remove_small_regions, Region};
use crate::mask::{build_initial_masks, Mask};
use crate::morphology::{
    close, constrained_grow, morphological_gradient, open, opening_by_reconstruction,
};
use crate::render::{render_all, PngRasterEncoder, RasterEncoder, RenderConfig};
use crate::threshold::otsu_threshold;

/// Tunable constants of the core pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentParams {
    /// Added to the Otsu threshold when building the foreground mask
    pub luma_slack: u8,
    /// Seed for the k-means centroid sampler
    pub kmeans_seed: u64,
    pub kmeans_max_iterations: usize,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            luma_slack: 15,
            kmeans_seed: 12345,
            kmeans_max_iterations: 15,
        }
    }
}

/// Final masks and statistics, before rendering
#[derive(Debug, Clone)]
pub struct ObjectExtraction {
    /// Cleaned object mask
    pub mask: Mask,
    /// Boundary band of `mask`, used only for the outline overlay
    pub edges: Mask,
    pub threshold: u8,
    /// Regions kept by the first labeling pass
    pub regions: Vec<Region>,
}

/// Encoded outputs and area statistics for one image
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    pub width: u32,
    pub height: u32,
    pub threshold: u8,
    pub segment_count: usize,
    pub mask_image: Vec<u8>,
    pub outline_image: Vec<u8>,
    pub recolored_image: Vec<u8>,
    pub region_ids: Vec<u32>,
    pub areas_px: Vec<usize>,
    pub areas_percent: Vec<f64>,
}

/// Serializable view of a result without the image bytes
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationSummary {
    pub image: String,
    pub extractor: String,
    pub width: u32,
    pub height: u32,
    pub threshold: u8,
    pub segment_count: usize,
    pub total_area_percent: f64,
    pub regions: Vec<Region>,
}

impl SegmentationResult {
    /// Sum of the per-region percentages
    pub fn total_area_percent(&self) -> f64 {
        self.areas_percent.iter().sum()
    }

    pub fn regions(&self) -> Vec<Region> {
        self.region_ids
            .iter()
            .zip(&self.areas_px)
            .zip(&self.areas_percent)
            .map(|((&id, &area_px), &area_percent)| Region {
                id,
                area_px,
                area_percent,
            })
            .collect()
    }

    pub fn summary(&self, image: &str, extractor: &str) -> SegmentationSummary {
        SegmentationSummary {
            image: image.to_string(),
            extractor: extractor.to_string(),
            width: self.width,
            height: self.height,
            threshold: self.threshold,
            segment_count: self.segment_count,
            total_area_percent: self.total_area_percent(),
            regions: self.regions(),
        }
    }
}

/// Render the three outputs and encode them into a result
pub(crate) fn encode_result<E: RasterEncoder>(
    image: &RgbaImage,
    extraction: ObjectExtraction,
    render: &RenderConfig,
    encoder: &E,
) -> Result<SegmentationResult> {
    let rendered = render_all(image, &extraction.mask, &extraction.edges, render);

    let mask_image = encoder
        .encode(&rendered.mask)
        .map_err(SegmentationError::encoding)?;
    let outline_image = encoder
        .encode(&rendered.outline)
        .map_err(SegmentationError::encoding)?;
    let recolored_image = encoder
        .encode(&rendered.recolored)
        .map_err(SegmentationError::encoding)?;

    let regions = extraction.regions;
    Ok(SegmentationResult {
        width: image.width(),
        height: image.height(),
        threshold: extraction.threshold,
        segment_count: regions.len(),
        mask_image,
        outline_image,
        recolored_image,
        region_ids: regions.iter().map(|r| r.id).collect(),
        areas_px: regions.iter().map(|r| r.area_px).collect(),
        areas_percent: regions.iter().map(|r| r.area_percent).collect(),
    })
}

/// Unsupervised object extractor: Lab k-means, Otsu, morphology and labeling
#[derive(Debug, Clone)]
pub struct Segmenter<E: RasterEncoder = PngRasterEncoder> {
    pub params: SegmentParams,
    pub render: RenderConfig,
    encoder: E,
}

impl Default for Segmenter<PngRasterEncoder> {
    fn default() -> Self {
        Self::new(SegmentParams::default(), RenderConfig::default())
    }
}

impl Segmenter<PngRasterEncoder> {
    pub fn new(params: SegmentParams, render: RenderConfig) -> Self {
        Self::with_encoder(params, render, PngRasterEncoder)
    }
}

impl<E: RasterEncoder> Segmenter<E> {
    pub fn with_encoder(params: SegmentParams, render: RenderConfig, encoder: E) -> Self {
        Self {
            params,
            render,
            encoder,
        }
    }

    /// Segment with a generator seeded from [`SegmentParams::kmeans_seed`]
    pub fn segment(&self, image: &RgbaImage, min_region_size: u32) -> Result<SegmentationResult> {
        let mut rng = StdRng::seed_from_u64(self.params.kmeans_seed);
        self.segment_with_rng(image, min_region_size, &mut rng)
    }

    /// Segment using the given generator for centroid sampling
    pub fn segment_with_rng<R: Rng + ?Sized>(
        &self,
        image: &RgbaImage,
        min_region_size: u32,
        rng: &mut R,
    ) -> Result<SegmentationResult> {
        let extraction = self.extract_objects(image, min_region_size, rng)?;
        let result = encode_result(image, extraction, &self.render, &self.encoder)?;

        log::info!(
            "Segmentation finished: {} segment(s), {:.2}% of the image",
            result.segment_count,
            result.total_area_percent()
        );

        Ok(result)
    }

    /// Run the pipeline up to the final object mask and its edge band
    pub fn extract_objects<R: Rng + ?Sized>(
        &self,
        image: &RgbaImage,
        min_region_size: u32,
        rng: &mut R,
    ) -> Result<ObjectExtraction> {
        let (width, height) = image.dimensions();
        if width <= 1 || height <= 1 {
            return Err(SegmentationError::InputTooSmall { width, height });
        }

        log::info!(
            "Segmenting {}x{} image (min region size {})",
            width,
            height,
            min_region_size
        );

        let features = extract_features(image);

        let k = cluster_count(width, height);
        let clustering = KMeans::new(k, self.params.kmeans_max_iterations).fit(&features.lab, rng);
        let background = background_cluster(&clustering.assignments, width, height, k);
        log::debug!(
            "k-means: k={}, {} iteration(s), background cluster {}",
            k,
            clustering.iterations,
            background
        );

        let threshold = otsu_threshold(&features.luma);
        log::debug!("Otsu threshold: {}", threshold);

        let masks = build_initial_masks(
            width,
            height,
            &clustering.assignments,
            background,
            &features.luma,
            threshold,
            self.params.luma_slack,
        );

        let foreground = close(&open(&masks.foreground, 1), 2);

        let keep = min_keep(width, height, min_region_size);
        log::debug!("Minimum kept region area: {} px", keep);

        let labeling = label_components(&foreground, keep);
        if labeling.regions.is_empty() {
            log::warn!(
                "No region reached {} px ({} component(s) found)",
                keep,
                labeling.component_count
            );
            return Err(SegmentationError::NoObjectsFound);
        }

        let mut object = labeling.kept_mask(width, height);
        object = constrained_grow(&object, &masks.allow, 2);
        object = opening_by_reconstruction(&object, 1);
        object = close(&object, 1);
        object = fill_holes(&object);

        object = open(&object, 1);
        object = remove_small_regions(&object, min_region_size as usize);
        object = close(&object, 1);

        let edges = morphological_gradient(&object);

        Ok(ObjectExtraction {
            mask: object,
            edges,
            threshold,
            regions: labeling.regions,
        })
    }
}

/// Segment `image` with default parameters, rendering and PNG encoding
pub fn segment(image: &RgbaImage, min_region_size: u32) -> Result<SegmentationResult> {
    Segmenter::default().segment(image, min_region_size)
}
