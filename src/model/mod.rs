//! Classifier adapter
//!
//! Uniform scoring contract over a trained binary classifier: a forward
//! pass producing the positive-class probability, plus the layer
//! introspection the saliency extractor needs. The concrete implementation
//! is [`ConvNet`], a sequential CNN rebuilt from a serialized artifact;
//! tests substitute fakes through the [`Classifier`] trait.

mod layers;
mod network;
mod state;
mod synth;

pub use layers::{Activation, Conv2d, Dense, GlobalAvgPool, MaxPool2d};
pub use network::{ConvNet, Layer};
pub use state::{load_model, save_model, LayerSpec, ModelFormat, ModelMetadata, ModelState};
pub use synth::synthesize;

use crate::Result;
use ndarray::{Array3, Array4};

/// Capability contract required of a trained classifier
pub trait Classifier: Send + Sync {
    /// Forward pass: probability of the positive class, in [0, 1]
    fn predict(&self, input: &Array4<f32>) -> Result<f32>;

    /// Combined forward/backward pass capturing the named layer's output and
    /// the gradient of the positive-class probability with respect to it
    fn introspect(&self, input: &Array4<f32>, layer: &str) -> Result<Introspection>;
}

/// Result of a combined forward/backward pass over one named layer
#[derive(Debug, Clone)]
pub struct Introspection {
    /// The named layer's output, shape (h, w, channels)
    pub activation: Array3<f32>,

    /// d(score)/d(activation), same shape as the activation
    pub gradient: Array3<f32>,

    /// Positive-class probability from the same forward pass
    pub score: f32,
}
