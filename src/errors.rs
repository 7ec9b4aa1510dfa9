use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Boxed error returned by image encoders
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Custom error types for object segmentation
#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("Image too small to segment: {width}x{height}")]
    InputTooSmall { width: u32, height: u32 },

    #[error("No suitable objects found. Try adjusting the minimum region size.")]
    NoObjectsFound,

    #[error("Failed to encode image: {source}")]
    EncodingFailure {
        #[source]
        source: BoxedError,
    },

    #[error("Image dimensions {width}x{height} outside the supported range {min}..={max}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        min: u32,
        max: u32,
    },

    #[error("Minimum region size {value} outside the supported range {min}..={max}")]
    InvalidMinRegionSize { value: u32, min: u32, max: u32 },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("{} and {} would both write outputs named '{name}'", .first.display(), .second.display())]
    DuplicateOutputName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl SegmentationError {
    /// Wrap an encoder failure
    pub fn encoding<E>(source: E) -> Self
    where
        E: Into<BoxedError>,
    {
        Self::EncodingFailure { source: source.into() }
    }

    /// Short hint for the person who submitted the image
    pub fn suggestion(&self) -> &'static str {
        match self {
            SegmentationError::NoObjectsFound => {
                "Try a smaller minimum region size or an image with higher-contrast objects."
            }
            SegmentationError::InputTooSmall { .. } | SegmentationError::InvalidDimensions { .. } => {
                "Use an image between 50x50 and 4000x4000 pixels."
            }
            SegmentationError::InvalidMinRegionSize { .. } => {
                "Choose a minimum region size between 10 and 5000 pixels."
            }
            SegmentationError::Image(_) | SegmentationError::UnsupportedFormat(_) => {
                "Try a different image in PNG or JPEG format."
            }
            SegmentationError::DuplicateOutputName { .. } => {
                "Rename one of the inputs so their paths map to distinct output names."
            }
            _ => "Try different parameters or another image.",
        }
    }
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, SegmentationError>;
