use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;

use object_segment_lib::config::{Config, ExtractorChoice};
use object_segment_lib::image_io::{assign_output_names, get_image_files_in_dir, load_image_under};
use object_segment_lib::pipeline::{process_image, ImageReport};
use object_segment_lib::SegmentationError;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "ObjectSegment - Unsupervised object extraction")]
struct Args {
    /// Path to input file or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file (defaults are used if it does not exist)
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Minimum region size in pixels (overwrites config)
    #[clap(short, long)]
    min_region_size: Option<u32>,

    /// Object extractor (overwrites config)
    #[clap(short, long)]
    extractor: Option<ExtractorArg>,

    /// Enable debug mode (debug logging and per-region output)
    #[clap(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExtractorArg {
    Kmeans,
    Otsu,
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if Path::new(path).exists() {
        Ok(Config::from_file(path)?)
    } else {
        log::info!("Config file {} not found, using defaults", path);
        Ok(Config::default())
    }
}

fn report(path: &Path, outcome: &object_segment_lib::Result<ImageReport>) {
    match outcome {
        Ok(report) => println!(
            "{}: {} segment(s), {:.2}% of the image",
            path.display(),
            report.summary.segment_count,
            report.summary.total_area_percent
        ),
        Err(e) => eprintln!("{}: {} ({})", path.display(), e, e.suggestion()),
    }
}

fn process_path(
    path: &Path,
    root: &Path,
    config: &Config,
    debug: bool,
) -> object_segment_lib::Result<ImageReport> {
    let input_image = load_image_under(path, root)?;
    process_image(input_image, config, debug)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let mut config = load_config(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config))?;

    // Override config with command-line arguments
    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }

    if let Some(size) = args.min_region_size {
        config.min_region_size = size;
    }

    if let Some(extractor) = args.extractor {
        config.extractor = match extractor {
            ExtractorArg::Kmeans => ExtractorChoice::Kmeans,
            ExtractorArg::Otsu => ExtractorChoice::Otsu,
        };
    }

    config.validate()?;
    config.validate_paths()?;

    let start_time = Instant::now();

    let output_base = PathBuf::from(&config.output_base_dir);
    fs::create_dir_all(&output_base)
        .with_context(|| format!("creating output directory {}", output_base.display()))?;

    let input_path = PathBuf::from(&config.input_path);

    let failures = if input_path.is_file() {
        println!("Processing single file: {}", input_path.display());
        let root = input_path.parent().unwrap_or_else(|| Path::new(""));
        let outcome = process_path(&input_path, root, &config, args.debug);
        report(&input_path, &outcome);
        usize::from(outcome.is_err())
    } else if input_path.is_dir() {
        println!("Processing directory: {}", input_path.display());
        let image_files = get_image_files_in_dir(&input_path)?;
        println!("Found {} image files", image_files.len());

        // Fail before writing anything if two inputs would share output files
        assign_output_names(&input_path, &image_files)?;

        let outcomes: Vec<_> = if config.use_parallel {
            image_files
                .par_iter()
                .map(|path| process_path(path, &input_path, &config, args.debug))
                .collect()
        } else {
            image_files
                .iter()
                .map(|path| process_path(path, &input_path, &config, args.debug))
                .collect()
        };

        for (path, outcome) in image_files.iter().zip(&outcomes) {
            report(path, outcome);
        }
        outcomes.iter().filter(|o| o.is_err()).count()
    } else {
        return Err(SegmentationError::InvalidPath(input_path).into());
    };

    let elapsed = start_time.elapsed();
    println!("Processing completed in {:.2} seconds", elapsed.as_secs_f64());

    if failures > 0 {
        bail!("{} image(s) could not be segmented", failures);
    }

    Ok(())
}
