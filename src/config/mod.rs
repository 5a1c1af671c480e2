//! Pipeline configuration
//!
//! One serde struct covers everything the pipeline reads: the optional
//! classifier artifact path, the saliency target layer, the explainability
//! time bound, and the overlay blend weights. Configs load from YAML or
//! JSON, detected from the file extension, and validate before use.

mod cli;

pub use cli::{AssessArgs, Cli, Command, InfoArgs, InitArgs, OutputFormat, ValidateArgs};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default saliency target: the Keras-convention name of the last conv layer
pub const DEFAULT_TARGET_LAYER: &str = "conv2d_3";

/// Default explainability time bound in milliseconds
const DEFAULT_EXPLAIN_TIMEOUT_MS: u64 = 10_000;

/// Blend weights for the heatmap overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Weight of the original pixel
    pub original_weight: f32,
    /// Weight of the colorized heatmap pixel
    pub heatmap_weight: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self { original_weight: 0.6, heatmap_weight: 0.4 }
    }
}

/// Everything the assessment pipeline reads at construction time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Classifier artifact path; absent forces the heuristic scorer
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Named layer the saliency extractor targets
    #[serde(default = "default_target_layer")]
    pub target_layer: String,

    /// Upper bound on one saliency extraction pass, in milliseconds
    #[serde(default = "default_explain_timeout_ms")]
    pub explain_timeout_ms: u64,

    /// Overlay blend weights
    #[serde(default)]
    pub overlay: OverlayConfig,
}

fn default_target_layer() -> String {
    DEFAULT_TARGET_LAYER.to_string()
}

fn default_explain_timeout_ms() -> u64 {
    DEFAULT_EXPLAIN_TIMEOUT_MS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            target_layer: default_target_layer(),
            explain_timeout_ms: default_explain_timeout_ms(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Check the config for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.target_layer.is_empty() {
            return Err(Error::InvalidConfig("target_layer must not be empty".to_string()));
        }
        if self.explain_timeout_ms == 0 {
            return Err(Error::InvalidConfig("explain_timeout_ms must be positive".to_string()));
        }
        for (name, w) in [
            ("overlay.original_weight", self.overlay.original_weight),
            ("overlay.heatmap_weight", self.overlay.heatmap_weight),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(Error::InvalidConfig(format!("{name} must be in [0, 1], got {w}")));
            }
        }
        Ok(())
    }
}

/// Load and validate a pipeline config from a YAML or JSON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("yaml");
    let config: PipelineConfig = match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("JSON config parse failed: {e}")))?,
        _ => serde_yaml::from_str(&content)
            .map_err(|e| Error::Serialization(format!("YAML config parse failed: {e}")))?,
    };

    config.validate()?;
    Ok(config)
}
