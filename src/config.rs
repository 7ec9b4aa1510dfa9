use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Result, SegmentationError};
use crate::render::RenderConfig;
use crate::segmentation::SegmentParams;

/// Accepted range for the minimum region size
pub const MIN_REGION_SIZE_RANGE: (u32, u32) = (10, 5000);

/// Configuration for the segmentation CLI
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_input_path")]
    pub input_path: String,
    #[serde(default = "default_output_base_dir")]
    pub output_base_dir: String,

    #[serde(default = "default_min_region_size")]
    pub min_region_size: u32,
    #[serde(default)]
    pub extractor: ExtractorChoice,
    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    // Core pipeline parameters
    #[serde(default = "default_luma_slack")]
    pub luma_slack: u8,
    #[serde(default = "default_kmeans_seed")]
    pub kmeans_seed: u64,
    #[serde(default = "default_kmeans_max_iterations")]
    pub kmeans_max_iterations: usize,

    // Rendering
    #[serde(default = "default_object_color_rgb")]
    pub object_color_rgb: [u8; 3],
    #[serde(default = "default_outline_color_rgb")]
    pub outline_color_rgb: [u8; 3],
    #[serde(default = "default_background_color_rgb")]
    pub background_color_rgb: [u8; 3],
    #[serde(default = "default_fill_alpha")]
    pub fill_alpha: f32,
    #[serde(default = "default_tint_alpha")]
    pub tint_alpha: f32,

    // Outputs
    #[serde(default = "default_true")]
    pub write_csv: bool,
    #[serde(default = "default_true")]
    pub write_json: bool,
}

/// Which object extractor to run
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorChoice {
    /// Lab k-means with Otsu refinement and morphology
    #[default]
    Kmeans,
    /// Plain Otsu binarisation with an opening
    Otsu,
}

fn default_input_path() -> String {
    "./input".to_string()
}

fn default_output_base_dir() -> String {
    "./output".to_string()
}

fn default_min_region_size() -> u32 {
    50
}

fn default_parallel() -> bool {
    true
}

fn default_true() -> bool {
    true
}

fn default_luma_slack() -> u8 {
    15
}

fn default_kmeans_seed() -> u64 {
    12345
}

fn default_kmeans_max_iterations() -> usize {
    15
}

fn default_object_color_rgb() -> [u8; 3] {
    RenderConfig::default().object_color
}

fn default_outline_color_rgb() -> [u8; 3] {
    RenderConfig::default().outline_color
}

fn default_background_color_rgb() -> [u8; 3] {
    RenderConfig::default().background_color
}

fn default_fill_alpha() -> f32 {
    RenderConfig::default().fill_alpha
}

fn default_tint_alpha() -> f32 {
    RenderConfig::default().tint_alpha
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_base_dir: default_output_base_dir(),
            min_region_size: default_min_region_size(),
            extractor: ExtractorChoice::default(),
            use_parallel: default_parallel(),
            luma_slack: default_luma_slack(),
            kmeans_seed: default_kmeans_seed(),
            kmeans_max_iterations: default_kmeans_max_iterations(),
            object_color_rgb: default_object_color_rgb(),
            outline_color_rgb: default_outline_color_rgb(),
            background_color_rgb: default_background_color_rgb(),
            fill_alpha: default_fill_alpha(),
            tint_alpha: default_tint_alpha(),
            write_csv: true,
            write_json: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SegmentationError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            SegmentationError::Config(msg) => {
                SegmentationError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SegmentationError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate the segmentation parameters
    pub fn validate(&self) -> Result<()> {
        validate_min_region_size(self.min_region_size)?;

        if self.kmeans_max_iterations == 0 {
            return Err(SegmentationError::Config(
                "kmeans_max_iterations must be >= 1".to_string(),
            ));
        }

        for (name, alpha) in [("fill_alpha", self.fill_alpha), ("tint_alpha", self.tint_alpha)] {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(SegmentationError::Config(format!(
                    "{} must be between 0.0 and 1.0",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Validate and check that the input path exists
    pub fn validate_paths(&self) -> Result<()> {
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(SegmentationError::InvalidPath(input_path));
        }
        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            SegmentationError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }

    /// Core pipeline parameters
    pub fn segment_params(&self) -> SegmentParams {
        SegmentParams {
            luma_slack: self.luma_slack,
            kmeans_seed: self.kmeans_seed,
            kmeans_max_iterations: self.kmeans_max_iterations,
        }
    }

    /// Renderer colours and blend strengths
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            object_color: self.object_color_rgb,
            outline_color: self.outline_color_rgb,
            background_color: self.background_color_rgb,
            fill_alpha: self.fill_alpha,
            tint_alpha: self.tint_alpha,
        }
    }
}

/// Check a minimum region size against [`MIN_REGION_SIZE_RANGE`]
pub fn validate_min_region_size(value: u32) -> Result<()> {
    let (min, max) = MIN_REGION_SIZE_RANGE;
    if value < min || value > max {
        return Err(SegmentationError::InvalidMinRegionSize { value, min, max });
    }
    Ok(())
}
