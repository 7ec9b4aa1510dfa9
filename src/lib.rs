// src/lib.rs - Library interface for ObjectSegment

pub mod clustering;
pub mod color;
pub mod config;
pub mod errors;
pub mod extractors;
pub mod hole_filling;
pub mod image_io;
pub mod labeling;
pub mod mask;
pub mod morphology;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod segmentation;
pub mod threshold;

// Re-export commonly used types and functions
pub use errors::{Result, SegmentationError};
pub use config::Config;
pub use pipeline::process_image;
pub use image_io::{InputImage, load_image, save_image};

// Core pipeline
pub use segmentation::{
    segment,
    ObjectExtraction,
    SegmentParams,
    SegmentationResult,
    SegmentationSummary,
    Segmenter,
};
pub use extractors::{ObjectExtractor, OtsuThresholdExtractor};
pub use render::{PngRasterEncoder, RasterEncoder, RenderConfig};
pub use mask::Mask;
pub use labeling::Region;

// Re-export morphology functions
pub use morphology::{
    close,
    constrained_grow,
    dilate,
    erode,
    morphological_gradient,
    open,
    opening_by_reconstruction,
};
pub use hole_filling::fill_holes;
