//! Model artifact serialization
//!
//! An artifact is a `ModelState`: metadata, an ordered layer table, and the
//! flattened f32 weight data walked in layer order. JSON and YAML encodings
//! are supported, detected from the file extension.

use super::layers::Activation;
use super::network::{ConvNet, Layer};
use crate::{Error, Result};
use ndarray::{Array1, Array2, Array4};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Model artifact encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// JSON text encoding
    Json,
    /// YAML text encoding
    Yaml,
}

impl ModelFormat {
    /// Detect format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ModelFormat::Json),
            "yaml" | "yml" => Some(ModelFormat::Yaml),
            _ => None,
        }
    }
}

/// Model metadata carried inside the artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    /// Architecture family (e.g. "sequential")
    pub architecture: String,

    /// Artifact format version
    pub version: String,

    /// Custom metadata fields
    #[serde(default)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl ModelMetadata {
    /// Create metadata with minimal fields
    pub fn new(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.into(),
            version: "0.1.0".to_string(),
            custom: HashMap::new(),
        }
    }

    /// Add a custom metadata field
    pub fn with_custom(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }
}

/// One row of the artifact's layer table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerSpec {
    /// Convolution: weights (kh, kw, in_channels, filters) then bias
    Conv2d {
        /// Layer name
        name: String,
        /// Kernel edge lengths (kh, kw)
        kernel: [usize; 2],
        /// Input channel count
        in_channels: usize,
        /// Output filter count
        filters: usize,
        /// Fused activation
        activation: Activation,
    },
    /// Max pooling, no parameters
    MaxPool2d {
        /// Layer name
        name: String,
        /// Window edge length
        pool: usize,
    },
    /// Global average pooling, no parameters
    GlobalAvgPool {
        /// Layer name
        name: String,
    },
    /// Dense: weights (inputs, units) then bias
    Dense {
        /// Layer name
        name: String,
        /// Input width
        inputs: usize,
        /// Output width
        units: usize,
        /// Fused activation
        activation: Activation,
    },
}

impl LayerSpec {
    /// Number of f32 parameters this layer consumes from the data vector
    pub fn parameter_count(&self) -> usize {
        match self {
            LayerSpec::Conv2d { kernel, in_channels, filters, .. } => {
                kernel[0] * kernel[1] * in_channels * filters + filters
            }
            LayerSpec::Dense { inputs, units, .. } => inputs * units + units,
            LayerSpec::MaxPool2d { .. } | LayerSpec::GlobalAvgPool { .. } => 0,
        }
    }

    /// Layer name
    pub fn name(&self) -> &str {
        match self {
            LayerSpec::Conv2d { name, .. }
            | LayerSpec::MaxPool2d { name, .. }
            | LayerSpec::GlobalAvgPool { name }
            | LayerSpec::Dense { name, .. } => name,
        }
    }
}

/// Serializable model state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelState {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Ordered layer table
    pub layers: Vec<LayerSpec>,

    /// Flattened parameter data, layer order, weights before bias
    pub data: Vec<f32>,
}

impl ConvNet {
    /// Convert the network to its serializable state
    pub fn to_state(&self) -> ModelState {
        let mut data = Vec::new();
        let mut specs = Vec::new();

        for layer in self.layers() {
            match layer {
                Layer::Conv2d(l) => {
                    let (kh, kw, cin, filters) = l.weights.dim();
                    specs.push(LayerSpec::Conv2d {
                        name: l.name.clone(),
                        kernel: [kh, kw],
                        in_channels: cin,
                        filters,
                        activation: l.activation,
                    });
                    data.extend(l.weights.iter().copied());
                    data.extend(l.bias.iter().copied());
                }
                Layer::MaxPool2d(l) => {
                    specs.push(LayerSpec::MaxPool2d { name: l.name.clone(), pool: l.pool });
                }
                Layer::GlobalAvgPool(l) => {
                    specs.push(LayerSpec::GlobalAvgPool { name: l.name.clone() });
                }
                Layer::Dense(l) => {
                    let (inputs, units) = l.weights.dim();
                    specs.push(LayerSpec::Dense {
                        name: l.name.clone(),
                        inputs,
                        units,
                        activation: l.activation,
                    });
                    data.extend(l.weights.iter().copied());
                    data.extend(l.bias.iter().copied());
                }
            }
        }

        ModelState { metadata: self.metadata().clone(), layers: specs, data }
    }

    /// Rebuild a network from its serializable state
    pub fn from_state(state: ModelState) -> Result<Self> {
        let expected: usize = state.layers.iter().map(LayerSpec::parameter_count).sum();
        if expected != state.data.len() {
            return Err(Error::InvalidModel(format!(
                "layer table expects {expected} parameters, data has {}",
                state.data.len()
            )));
        }

        let mut offset = 0;
        let mut take = |count: usize| {
            let slice = state.data[offset..offset + count].to_vec();
            offset += count;
            slice
        };

        let mut layers = Vec::with_capacity(state.layers.len());
        for spec in &state.layers {
            let layer = match spec {
                LayerSpec::Conv2d { name, kernel, in_channels, filters, activation } => {
                    let weights = Array4::from_shape_vec(
                        (kernel[0], kernel[1], *in_channels, *filters),
                        take(kernel[0] * kernel[1] * in_channels * filters),
                    )
                    .map_err(|e| Error::InvalidModel(format!("{name}: {e}")))?;
                    let bias = Array1::from_vec(take(*filters));
                    Layer::conv2d(name.clone(), weights, bias, *activation)
                }
                LayerSpec::MaxPool2d { name, pool } => Layer::max_pool2d(name.clone(), *pool),
                LayerSpec::GlobalAvgPool { name } => Layer::global_avg_pool(name.clone()),
                LayerSpec::Dense { name, inputs, units, activation } => {
                    let weights = Array2::from_shape_vec((*inputs, *units), take(inputs * units))
                        .map_err(|e| Error::InvalidModel(format!("{name}: {e}")))?;
                    let bias = Array1::from_vec(take(*units));
                    Layer::dense(name.clone(), weights, bias, *activation)
                }
            };
            layers.push(layer);
        }

        Ok(ConvNet::new(state.metadata, layers))
    }
}

/// Load a model artifact from a file.
///
/// The format is detected from the file extension.
pub fn load_model(path: impl AsRef<Path>) -> Result<ConvNet> {
    let path = path.as_ref();

    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Serialization("File has no extension".to_string()))?;
    let format = ModelFormat::from_extension(ext)
        .ok_or_else(|| Error::Serialization(format!("Unsupported file extension: {ext}")))?;

    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;

    let state: ModelState = match format {
        ModelFormat::Json => serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}")))?,
        ModelFormat::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| Error::Serialization(format!("YAML deserialization failed: {e}")))?,
    };

    ConvNet::from_state(state)
}

/// Save a model artifact to a file in the given format.
pub fn save_model(model: &ConvNet, path: impl AsRef<Path>, format: ModelFormat) -> Result<()> {
    let state = model.to_state();

    let data = match format {
        ModelFormat::Json => serde_json::to_string(&state)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?,
        ModelFormat::Yaml => serde_yaml::to_string(&state)
            .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?,
    };

    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;

    Ok(())
}
