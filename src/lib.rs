//! Ictus: stroke-scan assessment library
//!
//! Turns a single medical scan image into a binary risk assessment together
//! with a Grad-CAM visualization of the image regions that drove the
//! decision.
//!
//! The pipeline is a pure function from (image bytes, optional classifier)
//! to an [`Assessment`]: preprocessing, a scoring strategy selected once at
//! construction (trained CNN or a deterministic pixel-statistics fallback),
//! gradient-based saliency extraction on the classifier path, heatmap
//! compositing, and fixed threshold bands mapping the confidence score to
//! discrete risk and stroke-type labels.
//!
//! # Example
//!
//! ```no_run
//! use ictus::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! let pipeline = Pipeline::from_config(config).expect("pipeline construction");
//!
//! let bytes = std::fs::read("scan.png").expect("read scan");
//! let assessment = pipeline.assess(&bytes).expect("assess");
//! println!("{}: {:.2}%", assessment.prediction, assessment.confidence);
//! ```

pub mod cli;
pub mod config;
pub mod decision;
pub mod gradcam;
pub mod heuristic;
pub mod model;
pub mod overlay;
pub mod pipeline;
pub mod preprocess;

mod error;

pub use config::{OverlayConfig, PipelineConfig};
pub use decision::{classify, Decision, RiskLevel, StrokeType};
pub use error::{Error, Result};
pub use model::{Classifier, ConvNet, Introspection};
pub use pipeline::{Assessment, Pipeline, ScoreStrategy};
