//! Image canonicalization
//!
//! Turns arbitrary uploaded bytes into the fixed-shape input tensor the
//! classifier consumes: RGB, 224×224, channel values scaled to [0, 1],
//! leading batch axis of 1.

use crate::{Error, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// Spatial edge length of the model input
pub const INPUT_SIZE: u32 = 224;

/// Decode an uploaded byte stream into an image.
///
/// This is the only fatal failure point of the pipeline: bytes that are not
/// a decodable image yield [`Error::UnsupportedImage`].
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| Error::UnsupportedImage(e.to_string()))
}

/// Canonicalize a decoded image into the model input tensor.
///
/// Grayscale inputs are expanded to three channels and alpha is dropped.
/// Resizing uses a fixed bilinear filter so identical inputs always yield
/// identical tensors.
pub fn to_input_tensor(image: &DynamicImage) -> Array4<f32> {
    let resized = image.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let size = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, size, size, 3));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = f32::from(pixel.0[c]) / 255.0;
        }
    }

    tensor
}
