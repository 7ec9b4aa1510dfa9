// src/pipeline.rs - File-level processing: validate, extract, persist

use std::path::PathBuf;

use crate::config::{Config, ExtractorChoice};
use crate::errors::Result;
use crate::extractors::{ObjectExtractor, OtsuThresholdExtractor};
use crate::image_io::{validate_dimensions, InputImage};
use crate::output::{save_result_images, write_regions_csv, write_summary_json, SavedImages};
use crate::segmentation::{SegmentationSummary, Segmenter};

/// What was produced for one input image
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub summary: SegmentationSummary,
    pub saved: SavedImages,
}

/// Build the extractor selected in the configuration
pub fn build_extractor(config: &Config) -> Box<dyn ObjectExtractor + Send + Sync> {
    match config.extractor {
        ExtractorChoice::Kmeans => Box::new(Segmenter::new(
            config.segment_params(),
            config.render_config(),
        )),
        ExtractorChoice::Otsu => Box::new(OtsuThresholdExtractor::new(config.render_config())),
    }
}

/// Segment a single image and write its outputs under `config.output_base_dir`
pub fn process_image(
    input_image: InputImage,
    config: &Config,
    debug: bool,
) -> Result<ImageReport> {
    let InputImage { image, path, filename } = input_image;

    config.validate()?;
    validate_dimensions(&image)?;

    let extractor = build_extractor(config);
    log::info!("Processing {} with the {} extractor", path.display(), extractor.name());

    let result = extractor.extract(&image, config.min_region_size)?;

    let output_dir = PathBuf::from(&config.output_base_dir);
    let saved = save_result_images(&result, &output_dir, &filename)?;

    let image_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(&filename)
        .to_string();
    let summary = result.summary(&image_name, extractor.name());

    if config.write_csv {
        write_regions_csv(&result, &output_dir, &filename)?;
    }
    if config.write_json {
        write_summary_json(&summary, &saved, &output_dir, &filename)?;
    }

    if debug {
        println!("Segmentation of {}:", image_name);
        println!("  Size: {}x{}", result.width, result.height);
        println!("  Threshold: {}", result.threshold);
        for region in &summary.regions {
            println!(
                "  Region {}: {} px ({:.2}%)",
                region.id, region.area_px, region.area_percent
            );
        }
        println!("  Mask: {}", saved.mask.display());
        println!("  Outline: {}", saved.outline.display());
        println!("  Recolored: {}", saved.recolored.display());
    }

    Ok(ImageReport { summary, saved })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SegmentationError;
    use crate::image_io::{load_image_under, save_image};
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn input(image: RgbaImage) -> InputImage {
        InputImage {
            image,
            path: PathBuf::from("samples/squares.png"),
            filename: "squares".to_string(),
        }
    }

    fn squares() -> RgbaImage {
        RgbaImage::from_fn(100, 100, |x, y| {
            let a = (10..30).contains(&x) && (10..30).contains(&y);
            let b = (60..90).contains(&x) && (60..90).contains(&y);
            if a || b {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    fn config_for(dir: &std::path::Path) -> Config {
        Config {
            output_base_dir: dir.to_string_lossy().into_owned(),
            min_region_size: 200,
            ..Config::default()
        }
    }

    #[test]
    fn writes_all_outputs() {
        let dir = tempdir().expect("tempdir");
        let config = config_for(dir.path());

        let report = process_image(input(squares()), &config, false).expect("process");
        assert_eq!(report.summary.segment_count, 2);
        assert_eq!(report.summary.image, "squares.png");

        assert!(dir.path().join(&report.saved.mask).is_file());
        assert!(dir.path().join(&report.saved.outline).is_file());
        assert!(dir.path().join(&report.saved.recolored).is_file());
        assert!(dir.path().join("regions/squares.csv").is_file());
        assert!(dir.path().join("summary/squares.json").is_file());
    }

    #[test]
    fn respects_output_toggles() {
        let dir = tempdir().expect("tempdir");
        let config = Config {
            write_csv: false,
            write_json: false,
            ..config_for(dir.path())
        };

        process_image(input(squares()), &config, false).expect("process");
        assert!(!dir.path().join("regions").exists());
        assert!(!dir.path().join("summary").exists());
    }

    #[test]
    fn rejects_images_outside_dimension_range() {
        let dir = tempdir().expect("tempdir");
        let config = config_for(dir.path());

        let err = process_image(input(RgbaImage::new(40, 100)), &config, false).unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidDimensions { .. }));
    }

    #[test]
    fn rejects_min_region_size_outside_range() {
        let dir = tempdir().expect("tempdir");
        let config = Config {
            min_region_size: 6000,
            ..config_for(dir.path())
        };

        let err = process_image(input(squares()), &config, false).unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidMinRegionSize { value: 6000, .. }));
    }

    #[test]
    fn rejects_invalid_config_before_segmenting() {
        let dir = tempdir().expect("tempdir");
        let config = Config {
            kmeans_max_iterations: 0,
            ..config_for(dir.path())
        };

        let err = process_image(input(squares()), &config, false).unwrap_err();
        assert!(matches!(err, SegmentationError::Config(_)));
        assert!(!dir.path().join("mask").exists());
    }

    #[test]
    fn same_stem_inputs_keep_separate_outputs() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("in");
        let first = root.join("a").join("x.png");
        let second = root.join("b").join("x.png");
        std::fs::create_dir_all(first.parent().expect("parent")).expect("mkdir");
        std::fs::create_dir_all(second.parent().expect("parent")).expect("mkdir");

        let one_square = RgbaImage::from_fn(100, 100, |x, y| {
            if (20..70).contains(&x) && (20..70).contains(&y) {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        save_image(&squares(), &first).expect("save");
        save_image(&one_square, &second).expect("save");

        let config = config_for(&dir.path().join("out"));
        let a = process_image(load_image_under(&first, &root).expect("load"), &config, false)
            .expect("first");
        let b = process_image(load_image_under(&second, &root).expect("load"), &config, false)
            .expect("second");

        assert_ne!(a.saved.mask, b.saved.mask);
        assert_eq!(a.saved.mask, PathBuf::from("mask/a__x_png.png"));
        assert_eq!(b.saved.mask, PathBuf::from("mask/b__x_png.png"));

        let out = dir.path().join("out");
        assert_eq!(std::fs::read_dir(out.join("mask")).expect("mask dir").count(), 2);
        assert!(out.join("regions/a__x_png.csv").is_file());
        assert!(out.join("summary/b__x_png.json").is_file());
        assert_eq!(a.summary.segment_count, 2);
        assert_eq!(b.summary.segment_count, 1);
    }

    #[test]
    fn selects_extractor_from_config() {
        let mut config = Config::default();
        assert_eq!(build_extractor(&config).name(), "kmeans");
        config.extractor = ExtractorChoice::Otsu;
        assert_eq!(build_extractor(&config).name(), "otsu");
    }
}
