//! Heatmap compositing
//!
//! Resizes a saliency map to the original image's dimensions, colorizes it
//! with a jet-style ramp (blue for near-zero importance through green and
//! yellow to red for near-one), alpha-blends it onto the original pixels,
//! and encodes the result as a base64 PNG payload.

use crate::config::OverlayConfig;
use crate::gradcam::ExplainError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbImage};
use ndarray::Array2;
use std::io::Cursor;

/// Map a normalized scalar through the jet color ramp.
///
/// The classic piecewise ramp: each channel is a clipped triangle wave, so
/// 0.0 → blue, 0.5 → green, 1.0 → red.
pub fn jet(value: f32) -> [u8; 3] {
    let v = value.clamp(0.0, 1.0);
    let channel = |center: f32| ((1.5 - (4.0 * v - center).abs()).clamp(0.0, 1.0) * 255.0) as u8;
    [channel(3.0), channel(2.0), channel(1.0)]
}

/// Composite the saliency map onto the original image.
///
/// The output always has the original image's dimensions, never the model
/// input's. Returns the encoded PNG as a base64 string.
pub fn compose(
    original: &DynamicImage,
    saliency: &Array2<f32>,
    config: &OverlayConfig,
) -> Result<String, ExplainError> {
    let (sh, sw) = saliency.dim();
    if sh == 0 || sw == 0 {
        return Err(ExplainError::Overlay("empty saliency map".to_string()));
    }

    let rgb = original.to_rgb8();
    let (width, height) = rgb.dimensions();

    // Quantize the map to 8-bit and let the image stack do the deterministic
    // bilinear resize up to the original resolution.
    let mut raw = Vec::with_capacity(sh * sw);
    for y in 0..sh {
        for x in 0..sw {
            raw.push((saliency[[y, x]].clamp(0.0, 1.0) * 255.0) as u8);
        }
    }
    let small = GrayImage::from_raw(sw as u32, sh as u32, raw)
        .ok_or_else(|| ExplainError::Overlay("saliency buffer mismatch".to_string()))?;
    let resized = image::imageops::resize(&small, width, height, FilterType::Triangle);

    let mut blended = RgbImage::new(width, height);
    for (x, y, pixel) in blended.enumerate_pixels_mut() {
        let heat = jet(f32::from(resized.get_pixel(x, y).0[0]) / 255.0);
        let base = rgb.get_pixel(x, y).0;
        for c in 0..3 {
            let v = config.original_weight * f32::from(base[c])
                + config.heatmap_weight * f32::from(heat[c]);
            pixel.0[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(blended)
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| ExplainError::Overlay(e.to_string()))?;

    Ok(STANDARD.encode(buf.into_inner()))
}
