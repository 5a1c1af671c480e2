//! Seeded synthesis of a demo classifier artifact
//!
//! Produces an untrained network with the default architecture so the
//! classifier path (scoring, introspection, saliency) can run without a
//! training pipeline. Weights are drawn from a seeded generator: the same
//! seed always yields the same artifact.

use super::layers::Activation;
use super::network::{ConvNet, Layer};
use super::state::ModelMetadata;
use ndarray::{Array1, Array2, Array4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Half-width of the uniform weight initialization
const WEIGHT_SCALE: f32 = 0.1;

fn conv_weights(rng: &mut StdRng, cin: usize, filters: usize) -> Array4<f32> {
    Array4::from_shape_fn((3, 3, cin, filters), |_| rng.gen_range(-WEIGHT_SCALE..WEIGHT_SCALE))
}

fn dense_weights(rng: &mut StdRng, inputs: usize, units: usize) -> Array2<f32> {
    Array2::from_shape_fn((inputs, units), |_| rng.gen_range(-WEIGHT_SCALE..WEIGHT_SCALE))
}

/// Build the default demo network with seeded random weights.
///
/// The architecture mirrors the production classifier family: four 3×3 conv
/// blocks with interleaved pooling, global average pooling, and a small
/// dense head ending in a single sigmoid unit. The last conv layer keeps the
/// Keras-convention name `conv2d_3` that the saliency extractor targets by
/// default.
pub fn synthesize(name: &str, seed: u64) -> ConvNet {
    let mut rng = StdRng::seed_from_u64(seed);

    let layers = vec![
        Layer::conv2d("conv2d", conv_weights(&mut rng, 3, 8), Array1::zeros(8), Activation::Relu),
        Layer::max_pool2d("max_pooling2d", 2),
        Layer::conv2d(
            "conv2d_1",
            conv_weights(&mut rng, 8, 8),
            Array1::zeros(8),
            Activation::Relu,
        ),
        Layer::max_pool2d("max_pooling2d_1", 2),
        Layer::conv2d(
            "conv2d_2",
            conv_weights(&mut rng, 8, 16),
            Array1::zeros(16),
            Activation::Relu,
        ),
        Layer::max_pool2d("max_pooling2d_2", 2),
        Layer::conv2d(
            "conv2d_3",
            conv_weights(&mut rng, 16, 16),
            Array1::zeros(16),
            Activation::Relu,
        ),
        Layer::global_avg_pool("global_average_pooling2d"),
        Layer::dense(
            "dense",
            dense_weights(&mut rng, 16, 8),
            Array1::zeros(8),
            Activation::Relu,
        ),
        Layer::dense(
            "dense_1",
            dense_weights(&mut rng, 8, 1),
            Array1::zeros(1),
            Activation::Sigmoid,
        ),
    ];

    let metadata = ModelMetadata::new(name, "sequential")
        .with_custom("seed", serde_json::json!(seed))
        .with_custom("trained", serde_json::json!(false));

    ConvNet::new(metadata, layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Classifier;
    use ndarray::Array4;

    #[test]
    fn test_same_seed_same_network() {
        let a = synthesize("demo", 42);
        let b = synthesize("demo", 42);

        let input = Array4::from_elem((1, 16, 16, 3), 0.3);
        let pa = a.predict(&input).unwrap();
        let pb = b.predict(&input).unwrap();
        assert_eq!(pa.to_bits(), pb.to_bits());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = synthesize("demo", 1);
        let b = synthesize("demo", 2);

        let input = Array4::from_elem((1, 16, 16, 3), 0.3);
        assert_ne!(
            a.predict(&input).unwrap().to_bits(),
            b.predict(&input).unwrap().to_bits()
        );
    }

    #[test]
    fn test_default_target_layer_present() {
        let net = synthesize("demo", 0);
        assert_eq!(net.last_conv_layer(), Some("conv2d_3"));
        assert!(net.layers().iter().any(|l| l.name() == "global_average_pooling2d"));
    }

    #[test]
    fn test_synthesized_network_introspects() {
        let net = synthesize("demo", 5);
        let input = Array4::from_elem((1, 32, 32, 3), 0.6);
        let intro = net.introspect(&input, "conv2d_3").unwrap();
        // 32 → 16 → 8 → 4 across the three pools; 16 filters in the last conv.
        assert_eq!(intro.activation.dim(), (4, 4, 16));
        assert_eq!(intro.gradient.dim(), (4, 4, 16));
        assert!((0.0..=1.0).contains(&intro.score));
    }
}
