//! Sequential CNN with named-layer introspection
//!
//! The network is a flat list of named layers. Scoring runs the whole list;
//! saliency extraction captures a named layer's output and computes the
//! gradient of the positive-class probability with respect to it by
//! replaying the remaining head with a scoped reverse-mode pass.

use super::layers::{Activation, Conv2d, Dense, GlobalAvgPool, MaxPool2d};
use super::state::ModelMetadata;
use super::{Classifier, Introspection};
use crate::{Error, Result};
use ndarray::{Array1, Array3, Array4, Axis};

/// A single named layer of the network
#[derive(Debug, Clone)]
pub enum Layer {
    /// 3×3 same-padding convolution
    Conv2d(Conv2d),
    /// Non-overlapping max pooling
    MaxPool2d(MaxPool2d),
    /// Global average pooling, the spatial→flat transition
    GlobalAvgPool(GlobalAvgPool),
    /// Fully-connected layer
    Dense(Dense),
}

impl Layer {
    /// Name used for introspection lookups
    pub fn name(&self) -> &str {
        match self {
            Layer::Conv2d(l) => &l.name,
            Layer::MaxPool2d(l) => &l.name,
            Layer::GlobalAvgPool(l) => &l.name,
            Layer::Dense(l) => &l.name,
        }
    }
}

/// Intermediate value flowing between layers
enum Value {
    Spatial(Array3<f32>),
    Flat(Array1<f32>),
}

impl Value {
    fn forward(self, layer: &Layer) -> Result<Value> {
        match (layer, self) {
            (Layer::Conv2d(l), Value::Spatial(a)) => Ok(Value::Spatial(l.forward(&a)?)),
            (Layer::MaxPool2d(l), Value::Spatial(a)) => Ok(Value::Spatial(l.forward(&a)?)),
            (Layer::GlobalAvgPool(l), Value::Spatial(a)) => Ok(Value::Flat(l.forward(&a))),
            (Layer::Dense(l), Value::Flat(v)) => Ok(Value::Flat(l.forward(&v)?)),
            (layer, _) => Err(Error::ShapeMismatch(format!(
                "layer {} received input of the wrong rank",
                layer.name()
            ))),
        }
    }
}

/// Trace of one dense layer's forward pass, kept for the backward walk
struct DenseTrace<'a> {
    layer: &'a Dense,
    pre: Array1<f32>,
    out: Array1<f32>,
}

/// Sequential convolutional classifier
#[derive(Debug, Clone)]
pub struct ConvNet {
    metadata: ModelMetadata,
    layers: Vec<Layer>,
}

impl ConvNet {
    /// Assemble a network from an ordered layer list
    pub fn new(metadata: ModelMetadata, layers: Vec<Layer>) -> Self {
        Self { metadata, layers }
    }

    /// Model metadata
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Ordered layer list
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Name of the last convolutional layer, the default saliency target
    pub fn last_conv_layer(&self) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find_map(|l| match l {
                Layer::Conv2d(c) => Some(c.name.as_str()),
                _ => None,
            })
    }

    fn layer_index(&self, name: &str) -> Result<usize> {
        self.layers
            .iter()
            .position(|l| l.name() == name)
            .ok_or_else(|| Error::LayerNotFound(name.to_string()))
    }

    fn input_plane(input: &Array4<f32>) -> Result<Array3<f32>> {
        let (batch, _, _, _) = input.dim();
        if batch != 1 {
            return Err(Error::ShapeMismatch(format!(
                "expected batch axis of 1, got {batch}"
            )));
        }
        Ok(input.index_axis(Axis(0), 0).to_owned())
    }

    /// Forward through the head (global pooling + dense chain) following the
    /// captured activation, tracing what the backward walk needs.
    ///
    /// Heads containing further convolution or pooling after the target layer
    /// are out of contract for the scoped gradient routine and rejected.
    fn replay_head<'a>(
        &'a self,
        head: &'a [Layer],
        activation: &Array3<f32>,
    ) -> Result<(Vec<DenseTrace<'a>>, f32)> {
        let mut layers = head.iter();
        let pooled = match layers.next() {
            Some(Layer::GlobalAvgPool(gap)) => gap.forward(activation),
            _ => {
                return Err(Error::ShapeMismatch(
                    "saliency target must feed directly into global average pooling".to_string(),
                ))
            }
        };

        let mut traces: Vec<DenseTrace<'a>> = Vec::new();
        let mut value = pooled;
        for layer in layers {
            let Layer::Dense(dense) = layer else {
                return Err(Error::ShapeMismatch(format!(
                    "unsupported layer {} after saliency target",
                    layer.name()
                )));
            };
            let (pre, out) = dense.forward_traced(&value)?;
            value = out.clone();
            traces.push(DenseTrace { layer: dense, pre, out });
        }

        if value.len() != 1 {
            return Err(Error::ShapeMismatch(format!(
                "expected scalar output, got {} values",
                value.len()
            )));
        }

        Ok((traces, value[0]))
    }
}

impl Classifier for ConvNet {
    fn predict(&self, input: &Array4<f32>) -> Result<f32> {
        let mut value = Value::Spatial(Self::input_plane(input)?);
        for layer in &self.layers {
            value = value.forward(layer)?;
        }
        match value {
            Value::Flat(v) if v.len() == 1 => Ok(v[0].clamp(0.0, 1.0)),
            _ => Err(Error::ShapeMismatch(
                "network did not reduce to a scalar probability".to_string(),
            )),
        }
    }

    fn introspect(&self, input: &Array4<f32>, layer: &str) -> Result<Introspection> {
        let idx = self.layer_index(layer)?;

        // Forward to the target layer inclusive, capturing its output.
        let mut value = Value::Spatial(Self::input_plane(input)?);
        for l in &self.layers[..=idx] {
            value = value.forward(l)?;
        }
        let Value::Spatial(activation) = value else {
            return Err(Error::ShapeMismatch(format!(
                "saliency target {layer} does not produce a spatial map"
            )));
        };

        let (traces, score) = self.replay_head(&self.layers[idx + 1..], &activation)?;

        // Reverse-mode walk from the probability back to the pooled vector.
        // Seed with d(score)/d(out_last) = 1.
        let mut grad = Array1::from_elem(1, 1.0_f32);
        for trace in traces.iter().rev() {
            let grad_pre = Array1::from_shape_fn(grad.len(), |j| {
                grad[j] * trace.layer.activation.derivative(trace.pre[j], trace.out[j])
            });
            grad = trace.layer.weights.dot(&grad_pre);
        }

        // Through global average pooling every spatial cell contributes
        // 1/(h·w) of its channel's pooled value.
        let (h, w, channels) = activation.dim();
        if grad.len() != channels {
            return Err(Error::ShapeMismatch(format!(
                "gradient has {} channels, activation has {channels}",
                grad.len()
            )));
        }
        let n = (h * w) as f32;
        let gradient = Array3::from_shape_fn((h, w, channels), |(_, _, c)| grad[c] / n);

        Ok(Introspection {
            activation,
            gradient,
            score: score.clamp(0.0, 1.0),
        })
    }
}

/// Convenience constructors used by artifact loading and synthesis
impl Layer {
    /// Convolution layer from raw parts
    pub fn conv2d(
        name: impl Into<String>,
        weights: Array4<f32>,
        bias: Array1<f32>,
        activation: Activation,
    ) -> Self {
        Layer::Conv2d(Conv2d { name: name.into(), weights, bias, activation })
    }

    /// Max-pooling layer
    pub fn max_pool2d(name: impl Into<String>, pool: usize) -> Self {
        Layer::MaxPool2d(MaxPool2d { name: name.into(), pool })
    }

    /// Global average pooling layer
    pub fn global_avg_pool(name: impl Into<String>) -> Self {
        Layer::GlobalAvgPool(GlobalAvgPool { name: name.into() })
    }

    /// Dense layer from raw parts
    pub fn dense(
        name: impl Into<String>,
        weights: ndarray::Array2<f32>,
        bias: Array1<f32>,
        activation: Activation,
    ) -> Self {
        Layer::Dense(Dense { name: name.into(), weights, bias, activation })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    /// Minimal network: 1x1 conv (identity), GAP, dense sigmoid head.
    fn tiny_net(dense_weight: f32, dense_bias: f32) -> ConvNet {
        let layers = vec![
            Layer::conv2d(
                "conv2d",
                Array4::from_shape_vec((1, 1, 1, 1), vec![1.0]).unwrap(),
                Array1::zeros(1),
                Activation::Relu,
            ),
            Layer::global_avg_pool("global_average_pooling2d"),
            Layer::dense(
                "dense",
                Array2::from_shape_vec((1, 1), vec![dense_weight]).unwrap(),
                array![dense_bias],
                Activation::Sigmoid,
            ),
        ];
        ConvNet::new(ModelMetadata::new("tiny", "sequential"), layers)
    }

    fn input_of(v: f32) -> Array4<f32> {
        Array4::from_elem((1, 4, 4, 1), v)
    }

    #[test]
    fn test_predict_sigmoid_head() {
        // GAP of a constant plane is the constant; sigmoid(2*0.5) ≈ 0.731.
        let net = tiny_net(2.0, 0.0);
        let p = net.predict(&input_of(0.5)).unwrap();
        assert!((p - 1.0 / (1.0 + (-1.0_f32).exp())).abs() < 1e-6);
    }

    #[test]
    fn test_predict_is_in_unit_interval() {
        let net = tiny_net(100.0, 50.0);
        let p = net.predict(&input_of(1.0)).unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_introspect_scores_match_predict() {
        let net = tiny_net(2.0, -0.3);
        let input = input_of(0.7);
        let p = net.predict(&input).unwrap();
        let intro = net.introspect(&input, "conv2d").unwrap();
        assert!((intro.score - p).abs() < 1e-6);
    }

    #[test]
    fn test_introspect_gradient_matches_finite_difference() {
        let net = tiny_net(3.0, -1.0);
        let input = input_of(0.4);
        let intro = net.introspect(&input, "conv2d").unwrap();

        // Finite difference on one activation cell: nudging a single cell of
        // the 4x4 plane moves the pooled mean by eps/16.
        let eps = 1e-3_f32;
        let base = net.predict(&input).unwrap();
        let mut nudged = input.clone();
        nudged[[0, 2, 2, 0]] += eps;
        let moved = net.predict(&nudged).unwrap();
        let numeric = (moved - base) / eps;

        let analytic = intro.gradient[[2, 2, 0]];
        assert_abs_diff_eq!(numeric, analytic, epsilon = 1e-3);
    }

    #[test]
    fn test_introspect_unknown_layer() {
        let net = tiny_net(1.0, 0.0);
        let err = net.introspect(&input_of(0.5), "conv2d_7").unwrap_err();
        assert!(matches!(err, Error::LayerNotFound(_)));
    }

    #[test]
    fn test_introspect_rejects_non_spatial_target() {
        let net = tiny_net(1.0, 0.0);
        let err = net.introspect(&input_of(0.5), "dense").unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn test_last_conv_layer() {
        let net = tiny_net(1.0, 0.0);
        assert_eq!(net.last_conv_layer(), Some("conv2d"));
    }

    #[test]
    fn test_batch_axis_must_be_one() {
        let net = tiny_net(1.0, 0.0);
        let bad = Array4::from_elem((2, 4, 4, 1), 0.5);
        assert!(net.predict(&bad).is_err());
    }
}
