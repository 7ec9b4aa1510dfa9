//! Per-pixel colour features: CIE L*a*b* (D65) and Rec. 709 luma
//!
//! The Lab conversion linearises sRGB, projects into CIE XYZ with the
//! standard sRGB matrix and applies the CIE `f(t)` companding against the
//! D65 reference white.

use image::RgbaImage;

/// D65 reference white in XYZ
pub const D65_WHITE_XYZ: [f64; 3] = [0.95047, 1.0, 1.08883];

/// Linear-RGB to XYZ matrix for sRGB primaries
const SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// `(6/29)^3`
const LAB_EPSILON: f64 = 216.0 / 24389.0;

/// Features for every pixel of an image, in row-major order
#[derive(Debug, Clone)]
pub struct ColorFeatures {
    pub lab: Vec<[f32; 3]>,
    pub luma: Vec<u8>,
}

/// Inverse sRGB transfer function on a channel in `[0, 1]`
#[inline]
pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        let delta = 6.0 / 29.0;
        t / (3.0 * delta * delta) + 4.0 / 29.0
    }
}

/// Convert an 8-bit sRGB triple to CIE L*a*b*
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> [f32; 3] {
    let rgb = [
        srgb_to_linear(r as f64 / 255.0),
        srgb_to_linear(g as f64 / 255.0),
        srgb_to_linear(b as f64 / 255.0),
    ];

    let mut xyz = [0.0f64; 3];
    for (out, row) in xyz.iter_mut().zip(SRGB_TO_XYZ.iter()) {
        *out = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2];
    }

    let fx = lab_f(xyz[0] / D65_WHITE_XYZ[0]);
    let fy = lab_f(xyz[1] / D65_WHITE_XYZ[1]);
    let fz = lab_f(xyz[2] / D65_WHITE_XYZ[2]);

    [
        (116.0 * fy - 16.0) as f32,
        (500.0 * (fx - fy)) as f32,
        (200.0 * (fy - fz)) as f32,
    ]
}

/// Integer luma: `round(0.2126 r + 0.7152 g + 0.0722 b)`
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64;
    y.round().clamp(0.0, 255.0) as u8
}

/// Extract Lab and luma for every pixel; alpha is ignored
pub fn extract_features(image: &RgbaImage) -> ColorFeatures {
    let n = image.width() as usize * image.height() as usize;
    let mut lab = Vec::with_capacity(n);
    let mut luma_values = Vec::with_capacity(n);

    for pixel in image.pixels() {
        let [r, g, b, _] = pixel.0;
        lab.push(rgb_to_lab(r, g, b));
        luma_values.push(luma(r, g, b));
    }

    ColorFeatures { lab, luma: luma_values }
}
