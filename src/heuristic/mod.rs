//! Fallback pixel-statistics scorer
//!
//! When no trained classifier artifact is available the pipeline degrades to
//! this scorer instead of failing. The score is a fixed linear blend of the
//! luminance mean and spread and is a placeholder contract, not a medical
//! signal: identical image bytes always yield the identical score, and the
//! score always lies in [0, 1].

use image::DynamicImage;

/// Weight of the mean-intensity term
const MEAN_WEIGHT: f64 = 0.4;

/// Weight of the intensity-spread term
const STD_WEIGHT: f64 = 0.6;

/// Derive a pseudo-confidence in [0, 1] from raw pixel statistics.
///
/// The image is reduced to single-channel luminance; the mean `m` and
/// population standard deviation `s` are taken over all pixels on the 0–255
/// scale, and the score is `clamp(0.4·m/255 + 0.6·s/128, 0, 1)`.
pub fn heuristic_score(image: &DynamicImage) -> f64 {
    let gray = image.to_luma8();
    let n = (gray.width() as f64) * (gray.height() as f64);

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for pixel in gray.pixels() {
        let v = f64::from(pixel.0[0]);
        sum += v;
        sum_sq += v * v;
    }

    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);
    let std = variance.sqrt();

    let risk = MEAN_WEIGHT * mean / 255.0 + STD_WEIGHT * std / 128.0;
    risk.clamp(0.0, 1.0)
}
