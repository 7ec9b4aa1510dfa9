use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::fs;
use image::{ImageFormat, RgbaImage};

use crate::errors::{Result, SegmentationError};

/// Extensions accepted as input images
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Accepted range for both image dimensions
pub const DIMENSION_RANGE: (u32, u32) = (50, 4000);

/// Represents an input image with its metadata
pub struct InputImage {
    pub image: RgbaImage,
    pub path: PathBuf,
    pub filename: String,
}

/// Whether the path carries one of [`SUPPORTED_EXTENSIONS`]
pub fn is_supported_image<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Get all supported image files from a directory (recursively), sorted by path
pub fn get_image_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(SegmentationError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(SegmentationError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let mut image_files = Vec::new();
    find_image_files_recursive(dir_path, &mut image_files)?;
    image_files.sort();

    Ok(image_files)
}

fn find_image_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            find_image_files_recursive(&path, result)?;
        } else if path.is_file() && is_supported_image(&path) {
            result.push(path);
        }
    }

    Ok(())
}

/// Load an image, converting it to RGBA
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    if !is_supported_image(path) {
        return Err(SegmentationError::UnsupportedFormat(path.to_path_buf()));
    }

    let filename = path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SegmentationError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let rgba_img = image::open(path)?.to_rgba8();

    Ok(InputImage {
        image: rgba_img,
        path: path.to_path_buf(),
        filename,
    })
}

/// Output name for `path`, taken from its location under `root`.
///
/// Path components are joined with `__` and dots become `_`, so the extension
/// is kept: `a/x.png` under `root` maps to `a__x_png`.
pub fn output_name<P: AsRef<Path>, Q: AsRef<Path>>(path: P, root: Q) -> String {
    let path = path.as_ref();
    let relative = path.strip_prefix(root.as_ref()).unwrap_or(path);

    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().replace('.', "_")),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("__")
}

/// Pair every file with its [`output_name`], failing if two files collide
pub fn assign_output_names<P: AsRef<Path>>(
    root: P,
    files: &[PathBuf],
) -> Result<Vec<(PathBuf, String)>> {
    let root = root.as_ref();
    let mut seen: HashMap<String, &PathBuf> = HashMap::new();
    let mut named = Vec::with_capacity(files.len());

    for file in files {
        let name = output_name(file, root);
        if let Some(first) = seen.insert(name.clone(), file) {
            return Err(SegmentationError::DuplicateOutputName {
                name,
                first: first.clone(),
                second: file.clone(),
            });
        }
        named.push((file.clone(), name));
    }

    Ok(named)
}

/// Load an image and name its outputs after its location under `root`
pub fn load_image_under<P: AsRef<Path>, Q: AsRef<Path>>(path: P, root: Q) -> Result<InputImage> {
    let mut input = load_image(path.as_ref())?;
    input.filename = output_name(path, root);
    Ok(input)
}

/// Reject images whose width or height falls outside [`DIMENSION_RANGE`]
pub fn validate_dimensions(image: &RgbaImage) -> Result<()> {
    let (min, max) = DIMENSION_RANGE;
    let (width, height) = image.dimensions();
    let in_range = |v: u32| v >= min && v <= max;

    if !in_range(width) || !in_range(height) {
        return Err(SegmentationError::InvalidDimensions { width, height, min, max });
    }

    Ok(())
}

/// Save an RGBA image as PNG
pub fn save_image<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Write already-encoded image bytes, creating parent directories
pub fn save_encoded<P: AsRef<Path>>(bytes: &[u8], path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}
