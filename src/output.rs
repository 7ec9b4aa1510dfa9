use std::fs;
use std::path::{Path, PathBuf};
use csv::Writer;
use serde::Serialize;

use crate::errors::Result;
use crate::image_io::save_encoded;
use crate::segmentation::{SegmentationResult, SegmentationSummary};

/// Subdirectories of the output root, one per rendered image kind
pub const MASK_DIR: &str = "mask";
pub const OUTLINE_DIR: &str = "outline";
pub const RECOLORED_DIR: &str = "recolored";
pub const REGIONS_DIR: &str = "regions";
pub const SUMMARY_DIR: &str = "summary";

/// Locations of the saved images, relative to the output root
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedImages {
    pub mask: PathBuf,
    pub outline: PathBuf,
    pub recolored: PathBuf,
}

#[derive(Serialize)]
struct SummaryRecord<'a> {
    #[serde(flatten)]
    summary: &'a SegmentationSummary,
    outputs: &'a SavedImages,
}

/// Write the three encoded images under `output_dir`
pub fn save_result_images<P: AsRef<Path>>(
    result: &SegmentationResult,
    output_dir: P,
    filename: &str,
) -> Result<SavedImages> {
    let output_dir = output_dir.as_ref();
    let file = format!("{}.png", filename);

    let saved = SavedImages {
        mask: Path::new(MASK_DIR).join(&file),
        outline: Path::new(OUTLINE_DIR).join(&file),
        recolored: Path::new(RECOLORED_DIR).join(&file),
    };

    save_encoded(&result.mask_image, output_dir.join(&saved.mask))?;
    save_encoded(&result.outline_image, output_dir.join(&saved.outline))?;
    save_encoded(&result.recolored_image, output_dir.join(&saved.recolored))?;

    Ok(saved)
}

/// Write per-region area statistics to `regions/<filename>.csv`
pub fn write_regions_csv<P: AsRef<Path>>(
    result: &SegmentationResult,
    output_dir: P,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = output_dir.as_ref().join(REGIONS_DIR).join(format!("{}.csv", filename));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record(["Region_Id", "Area_Px", "Area_Percent"])?;

    for region in result.regions() {
        writer.write_record(&[
            region.id.to_string(),
            region.area_px.to_string(),
            format!("{:.6}", region.area_percent),
        ])?;
    }

    writer.flush()?;

    Ok(output_path)
}

/// Write the summary and saved image locations to `summary/<filename>.json`
pub fn write_summary_json<P: AsRef<Path>>(
    summary: &SegmentationSummary,
    saved: &SavedImages,
    output_dir: P,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = output_dir.as_ref().join(SUMMARY_DIR).join(format!("{}.json", filename));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let record = SummaryRecord { summary, outputs: saved };
    fs::write(&output_path, serde_json::to_string_pretty(&record)?)?;

    Ok(output_path)
}
