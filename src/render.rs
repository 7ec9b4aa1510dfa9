// src/render.rs - Mask, outline overlay and recolored composites

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::errors::BoxedError;
use crate::mask::Mask;

/// Colours and blend strengths used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Accent colour for object pixels
    pub object_color: [u8; 3],
    /// Colour painted over edge pixels in the overlay
    pub outline_color: [u8; 3],
    /// Mask image background
    pub background_color: [u8; 3],
    /// Accent weight for object pixels in the overlay
    pub fill_alpha: f32,
    /// Accent weight for object pixels in the recolored image
    pub tint_alpha: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            object_color: [0, 180, 255],
            outline_color: [255, 0, 0],
            background_color: [0, 0, 0],
            fill_alpha: 0.45,
            tint_alpha: 0.65,
        }
    }
}

/// The three rendered rasters
#[derive(Debug, Clone)]
pub struct RenderedImages {
    pub mask: RgbaImage,
    pub outline: RgbaImage,
    pub recolored: RgbaImage,
}

/// Turns a raster into an opaque byte buffer
pub trait RasterEncoder {
    fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>, BoxedError>;
}

/// PNG encoding through the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct PngRasterEncoder;

impl RasterEncoder for PngRasterEncoder {
    fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>, BoxedError> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes).write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgba8,
        )?;
        Ok(bytes)
    }
}

/// `clamp(round(alpha * tint + (1 - alpha) * orig), 0, 255)`
#[inline]
pub fn blend(orig: u8, tint: u8, alpha: f32) -> u8 {
    let v = alpha * tint as f32 + (1.0 - alpha) * orig as f32;
    v.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn blend_pixel(pixel: &Rgba<u8>, color: [u8; 3], alpha: f32) -> Rgba<u8> {
    Rgba([
        blend(pixel[0], color[0], alpha),
        blend(pixel[1], color[1], alpha),
        blend(pixel[2], color[2], alpha),
        255,
    ])
}

#[inline]
fn opaque(color: [u8; 3]) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], 255])
}

/// Object pixels in the accent colour on a flat background
pub fn render_mask(mask: &Mask, config: &RenderConfig) -> RgbaImage {
    let object = opaque(config.object_color);
    let background = opaque(config.background_color);
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get(x, y) {
            object
        } else {
            background
        }
    })
}

/// Original image with object pixels blended toward the accent colour and
/// edge pixels painted solid in the outline colour
pub fn render_outline(
    image: &RgbaImage,
    mask: &Mask,
    edges: &Mask,
    config: &RenderConfig,
) -> RgbaImage {
    let outline = opaque(config.outline_color);
    let mut overlay = image.clone();

    for (x, y, pixel) in overlay.enumerate_pixels_mut() {
        if edges.get(x, y) {
            *pixel = outline;
        } else if mask.get(x, y) {
            *pixel = blend_pixel(pixel, config.object_color, config.fill_alpha);
        }
    }

    overlay
}

/// Original image with object pixels tinted; background untouched
pub fn render_recolored(image: &RgbaImage, mask: &Mask, config: &RenderConfig) -> RgbaImage {
    let mut recolored = image.clone();
    for (x, y, pixel) in recolored.enumerate_pixels_mut() {
        if mask.get(x, y) {
            *pixel = blend_pixel(pixel, config.object_color, config.tint_alpha);
        }
    }
    recolored
}

/// Render all three outputs
pub fn render_all(
    image: &RgbaImage,
    mask: &Mask,
    edges: &Mask,
    config: &RenderConfig,
) -> RenderedImages {
    RenderedImages {
        mask: render_mask(mask, config),
        outline: render_outline(image, mask, edges, config),
        recolored: render_recolored(image, mask, config),
    }
}
