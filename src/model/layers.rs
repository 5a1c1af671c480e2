//! CNN layer primitives
//!
//! Plain f32 ndarray implementations of the layers the stroke classifier is
//! built from. Convolutions are 3×3/stride-1/same-padding in the Keras
//! convention the original artifacts used, so spatial dimensions survive
//! every conv and halve at each pooling step.

use crate::{Error, Result};
use ndarray::{Array1, Array2, Array3, Array4, Axis};
use serde::{Deserialize, Serialize};

/// Elementwise activation applied by a conv or dense layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Identity
    #[default]
    Linear,
    /// max(x, 0)
    Relu,
    /// 1 / (1 + e^-x)
    Sigmoid,
}

impl Activation {
    /// Apply the activation to a single pre-activation value
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }

    /// Derivative of the activation, given both the pre-activation input
    /// and the activated output (sigmoid' is cheapest from the output)
    pub fn derivative(self, pre: f32, out: f32) -> f32 {
        match self {
            Activation::Linear => 1.0,
            Activation::Relu => {
                if pre > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Sigmoid => out * (1.0 - out),
        }
    }
}

/// 2-D convolution, stride 1, same padding
#[derive(Debug, Clone)]
pub struct Conv2d {
    /// Layer name used for introspection lookups
    pub name: String,
    /// Kernel weights, shape (kh, kw, in_channels, filters)
    pub weights: Array4<f32>,
    /// Per-filter bias
    pub bias: Array1<f32>,
    /// Activation fused into the layer
    pub activation: Activation,
}

impl Conv2d {
    /// Forward pass over a (h, w, c) feature map
    pub fn forward(&self, input: &Array3<f32>) -> Result<Array3<f32>> {
        let (h, w, cin) = input.dim();
        let (kh, kw, wcin, filters) = self.weights.dim();
        if cin != wcin {
            return Err(Error::ShapeMismatch(format!(
                "{}: expected {wcin} input channels, got {cin}",
                self.name
            )));
        }

        let ph = kh / 2;
        let pw = kw / 2;
        let mut out = Array3::<f32>::zeros((h, w, filters));

        for y in 0..h {
            for x in 0..w {
                for f in 0..filters {
                    let mut acc = self.bias[f];
                    for ky in 0..kh {
                        let iy = y + ky;
                        if iy < ph || iy - ph >= h {
                            continue;
                        }
                        let iy = iy - ph;
                        for kx in 0..kw {
                            let ix = x + kx;
                            if ix < pw || ix - pw >= w {
                                continue;
                            }
                            let ix = ix - pw;
                            for c in 0..cin {
                                acc += input[[iy, ix, c]] * self.weights[[ky, kx, c, f]];
                            }
                        }
                    }
                    out[[y, x, f]] = self.activation.apply(acc);
                }
            }
        }

        Ok(out)
    }
}

/// 2-D max pooling, square window, stride equal to window size
#[derive(Debug, Clone)]
pub struct MaxPool2d {
    /// Layer name
    pub name: String,
    /// Window edge length
    pub pool: usize,
}

impl MaxPool2d {
    /// Forward pass; truncates edges that do not fill a full window
    pub fn forward(&self, input: &Array3<f32>) -> Result<Array3<f32>> {
        if self.pool == 0 {
            return Err(Error::ShapeMismatch(format!(
                "{}: pool window must be positive",
                self.name
            )));
        }
        let (h, w, c) = input.dim();
        let oh = h / self.pool;
        let ow = w / self.pool;
        if oh == 0 || ow == 0 {
            return Err(Error::ShapeMismatch(format!(
                "{}: input {h}x{w} smaller than pool window {}",
                self.name, self.pool
            )));
        }

        let mut out = Array3::<f32>::zeros((oh, ow, c));
        for y in 0..oh {
            for x in 0..ow {
                for ch in 0..c {
                    let mut best = f32::NEG_INFINITY;
                    for dy in 0..self.pool {
                        for dx in 0..self.pool {
                            best = best.max(input[[y * self.pool + dy, x * self.pool + dx, ch]]);
                        }
                    }
                    out[[y, x, ch]] = best;
                }
            }
        }

        Ok(out)
    }
}

/// Global average pooling: (h, w, c) → (c,)
#[derive(Debug, Clone)]
pub struct GlobalAvgPool {
    /// Layer name
    pub name: String,
}

impl GlobalAvgPool {
    /// Forward pass: spatial mean per channel
    pub fn forward(&self, input: &Array3<f32>) -> Array1<f32> {
        let (h, w, c) = input.dim();
        let n = (h * w) as f32;
        let mut out = Array1::<f32>::zeros(c);
        for ch in 0..c {
            out[ch] = input.index_axis(Axis(2), ch).sum() / n;
        }
        out
    }
}

/// Fully-connected layer
#[derive(Debug, Clone)]
pub struct Dense {
    /// Layer name
    pub name: String,
    /// Weights, shape (inputs, units)
    pub weights: Array2<f32>,
    /// Per-unit bias
    pub bias: Array1<f32>,
    /// Activation fused into the layer
    pub activation: Activation,
}

impl Dense {
    /// Forward pass returning only the activated output
    pub fn forward(&self, input: &Array1<f32>) -> Result<Array1<f32>> {
        Ok(self.forward_traced(input)?.1)
    }

    /// Forward pass returning (pre-activation, output) for gradient replay
    pub fn forward_traced(&self, input: &Array1<f32>) -> Result<(Array1<f32>, Array1<f32>)> {
        let (inputs, _units) = self.weights.dim();
        if input.len() != inputs {
            return Err(Error::ShapeMismatch(format!(
                "{}: expected {inputs} inputs, got {}",
                self.name,
                input.len()
            )));
        }

        let pre = input.dot(&self.weights) + &self.bias;
        let out = pre.mapv(|x| self.activation.apply(x));
        Ok((pre, out))
    }
}
