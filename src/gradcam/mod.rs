//! Grad-CAM saliency extraction
//!
//! Weights the target layer's activations by the spatially-pooled gradient
//! of the positive-class probability, keeps only positive evidence, and
//! normalizes the result into a [0, 1] importance map. Every failure in
//! here is recoverable: the pipeline degrades to an assessment without a
//! visualization instead of aborting.

use crate::model::Classifier;
use ndarray::{Array1, Array2, Array3, Array4, Axis};
use thiserror::Error;

/// Raw maxima at or below this are treated as "no positive evidence"
const EPSILON: f32 = 1e-10;

/// Recoverable saliency failure; never escapes the pipeline
#[derive(Debug, Error)]
pub enum ExplainError {
    /// The classifier could not introspect the requested layer
    #[error("introspection failed: {0}")]
    Introspection(String),

    /// The saliency pass exceeded its time bound
    #[error("saliency extraction timed out")]
    Timeout,

    /// Heatmap compositing failed
    #[error("overlay failed: {0}")]
    Overlay(String),
}

/// Per-channel weights: spatial mean of the gradient
pub fn gradient_weights(gradient: &Array3<f32>) -> Array1<f32> {
    let (h, w, channels) = gradient.dim();
    let n = (h * w) as f32;
    let mut weights = Array1::<f32>::zeros(channels);
    for c in 0..channels {
        weights[c] = gradient.index_axis(Axis(2), c).sum() / n;
    }
    weights
}

/// Channel-weighted sum of activations, clipped at zero and normalized so
/// the maximum is 1. Returns the all-zero map when the raw maximum is at or
/// below epsilon, guarding the division.
pub fn weighted_saliency(activation: &Array3<f32>, weights: &Array1<f32>) -> Array2<f32> {
    let (h, w, channels) = activation.dim();

    let mut map = Array2::<f32>::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for c in 0..channels {
                acc += activation[[y, x, c]] * weights[c];
            }
            map[[y, x]] = acc.max(0.0);
        }
    }

    let max = map.iter().fold(0.0_f32, |m, &v| m.max(v));
    if max <= EPSILON {
        return Array2::zeros((h, w));
    }
    map.mapv_into(|v| v / max)
}

/// Compute the Grad-CAM saliency map for one input through the named layer.
pub fn saliency_map(
    classifier: &dyn Classifier,
    input: &Array4<f32>,
    layer: &str,
) -> Result<Array2<f32>, ExplainError> {
    let intro = classifier
        .introspect(input, layer)
        .map_err(|e| ExplainError::Introspection(e.to_string()))?;

    let weights = gradient_weights(&intro.gradient);
    Ok(weighted_saliency(&intro.activation, &weights))
}
