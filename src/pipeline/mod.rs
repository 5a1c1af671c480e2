//! Assessment pipeline
//!
//! Orchestrates one run: decode, tensorize, score through the strategy
//! fixed at construction time, attempt the saliency overlay on the
//! classifier path, threshold, and assemble the final record. The only
//! fatal failure is an undecodable image; everything else degrades to an
//! assessment without a visualization.

mod assessment;

pub use assessment::Assessment;

use crate::config::PipelineConfig;
use crate::gradcam::{self, ExplainError};
use crate::heuristic::heuristic_score;
use crate::model::{load_model, Classifier};
use crate::overlay;
use crate::{decision, preprocess, Result};
use image::DynamicImage;
use ndarray::Array4;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

/// Scoring strategy, selected once per process lifetime
#[derive(Clone)]
pub enum ScoreStrategy {
    /// Trained classifier, shared read-only across concurrent requests
    Model(Arc<dyn Classifier>),
    /// Deterministic pixel-statistics fallback
    Heuristic,
}

impl ScoreStrategy {
    /// True when a trained classifier backs this strategy
    pub fn is_model_backed(&self) -> bool {
        matches!(self, ScoreStrategy::Model(_))
    }
}

/// The inference-and-explainability pipeline
pub struct Pipeline {
    strategy: ScoreStrategy,
    config: PipelineConfig,
}

impl Pipeline {
    /// Build a pipeline from an explicit strategy.
    pub fn new(strategy: ScoreStrategy, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { strategy, config })
    }

    /// Build a pipeline from config alone.
    ///
    /// A missing or unloadable artifact selects the heuristic scorer, the
    /// same once-per-process substitution the original service performed at
    /// startup; it is not a per-request failure.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let strategy = match &config.model_path {
            Some(path) => match load_model(path) {
                Ok(net) => ScoreStrategy::Model(Arc::new(net)),
                Err(_) => ScoreStrategy::Heuristic,
            },
            None => ScoreStrategy::Heuristic,
        };
        Self::new(strategy, config)
    }

    /// The strategy this pipeline scores with
    pub fn strategy(&self) -> &ScoreStrategy {
        &self.strategy
    }

    /// Assess one scan image.
    ///
    /// Fails only when the bytes cannot be decoded as an image; every
    /// internal failure past that point degrades to an assessment without a
    /// visualization.
    pub fn assess(&self, bytes: &[u8]) -> Result<Assessment> {
        let image = preprocess::decode(bytes)?;

        let (confidence, visualization) = match &self.strategy {
            ScoreStrategy::Heuristic => (heuristic_score(&image) * 100.0, None),
            ScoreStrategy::Model(model) => {
                let tensor = preprocess::to_input_tensor(&image);
                match model.predict(&tensor) {
                    Ok(probability) => {
                        let visualization = self.explain(model, &tensor, &image);
                        (f64::from(probability) * 100.0, visualization)
                    }
                    // A classifier that cannot score this tensor degrades to
                    // the fallback for the request rather than failing it.
                    Err(_) => (heuristic_score(&image) * 100.0, None),
                }
            }
        };

        let confidence = round2(confidence);
        let decision = decision::classify(confidence);
        Ok(Assessment::assemble(confidence, decision, visualization))
    }

    /// Attempt the saliency overlay; every failure path, including the time
    /// bound, collapses to `None`.
    fn explain(
        &self,
        model: &Arc<dyn Classifier>,
        tensor: &Array4<f32>,
        original: &DynamicImage,
    ) -> Option<String> {
        let saliency = self.saliency_with_timeout(model, tensor).ok()?;
        overlay::compose(original, &saliency, &self.config.overlay).ok()
    }

    /// Run the combined forward/backward saliency pass on a worker thread,
    /// bounded by the configured timeout. On timeout the worker is
    /// abandoned; the request proceeds without a visualization.
    fn saliency_with_timeout(
        &self,
        model: &Arc<dyn Classifier>,
        tensor: &Array4<f32>,
    ) -> std::result::Result<ndarray::Array2<f32>, ExplainError> {
        let (tx, rx) = mpsc::channel();
        let model = Arc::clone(model);
        let tensor = tensor.clone();
        let layer = self.config.target_layer.clone();

        std::thread::spawn(move || {
            let result = gradcam::saliency_map(model.as_ref(), &tensor, &layer);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_millis(self.config.explain_timeout_ms)) {
            Ok(result) => result,
            Err(_) => Err(ExplainError::Timeout),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Introspection;
    use crate::{Error, RiskLevel, StrokeType};
    use image::{DynamicImage, Rgb, RgbImage};
    use ndarray::Array3;
    use std::io::Cursor;

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, image::ImageFormat::Png).expect("png encode");
        buf.into_inner()
    }

    fn gray_scan() -> Vec<u8> {
        png_bytes(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
            50,
            50,
            Rgb([128, 128, 128]),
        )))
    }

    /// Fake classifier with a fixed probability and configurable
    /// introspection behavior.
    struct FixedClassifier {
        probability: f32,
        introspection: Option<Introspection>,
        delay: Option<Duration>,
    }

    impl FixedClassifier {
        fn scoring(probability: f32) -> Self {
            Self { probability, introspection: None, delay: None }
        }

        fn with_introspection(probability: f32) -> Self {
            let activation = Array3::from_shape_fn((4, 4, 2), |(y, x, _)| (y + x) as f32);
            let gradient = Array3::from_elem((4, 4, 2), 0.5);
            Self {
                probability,
                introspection: Some(Introspection { activation, gradient, score: probability }),
                delay: None,
            }
        }
    }

    impl Classifier for FixedClassifier {
        fn predict(&self, _input: &Array4<f32>) -> Result<f32> {
            Ok(self.probability)
        }

        fn introspect(&self, _input: &Array4<f32>, layer: &str) -> Result<Introspection> {
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            self.introspection
                .clone()
                .ok_or_else(|| Error::LayerNotFound(layer.to_string()))
        }
    }

    fn model_pipeline(classifier: FixedClassifier) -> Pipeline {
        Pipeline::new(
            ScoreStrategy::Model(Arc::new(classifier)),
            PipelineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_heuristic_scenario_uniform_gray() {
        // Mean 128, zero spread: 0.4 * 128/255 * 100 rounds to 20.08.
        let pipeline = Pipeline::new(ScoreStrategy::Heuristic, PipelineConfig::default()).unwrap();
        let a = pipeline.assess(&gray_scan()).unwrap();

        assert!((a.confidence - 20.08).abs() < 1e-9);
        assert!(!a.stroke_detected);
        assert_eq!(a.risk_level, RiskLevel::Low);
        assert_eq!(a.stroke_type, StrokeType::None);
        assert!(a.visualization.is_none());
    }

    #[test]
    fn test_classifier_scenario_high_confidence() {
        let pipeline = model_pipeline(FixedClassifier::with_introspection(0.92));
        let a = pipeline.assess(&gray_scan()).unwrap();

        assert_eq!(a.confidence, 92.0);
        assert!(a.stroke_detected);
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(a.stroke_type, StrokeType::LikelyHemorrhagic);
        assert!(a.visualization.is_some());
    }

    #[test]
    fn test_undecodable_bytes_fail() {
        let pipeline = Pipeline::new(ScoreStrategy::Heuristic, PipelineConfig::default()).unwrap();
        let err = pipeline.assess(b"not an image at all").unwrap_err();
        assert!(matches!(err, Error::UnsupportedImage(_)));
    }

    #[test]
    fn test_introspection_failure_degrades_to_no_visualization() {
        let pipeline = model_pipeline(FixedClassifier::scoring(0.75));
        let a = pipeline.assess(&gray_scan()).unwrap();

        assert_eq!(a.confidence, 75.0);
        assert!(a.visualization.is_none());
        // The rest of the assessment is intact.
        assert_eq!(a.stroke_type, StrokeType::LikelyIschemic);
    }

    #[test]
    fn test_saliency_timeout_degrades() {
        let mut classifier = FixedClassifier::with_introspection(0.9);
        classifier.delay = Some(Duration::from_millis(300));

        let config = PipelineConfig { explain_timeout_ms: 20, ..Default::default() };
        let pipeline = Pipeline::new(ScoreStrategy::Model(Arc::new(classifier)), config).unwrap();

        let a = pipeline.assess(&gray_scan()).unwrap();
        assert_eq!(a.confidence, 90.0);
        assert!(a.visualization.is_none());
    }

    #[test]
    fn test_heuristic_is_deterministic_across_runs() {
        let pipeline = Pipeline::new(ScoreStrategy::Heuristic, PipelineConfig::default()).unwrap();
        let a = pipeline.assess(&gray_scan()).unwrap();
        let b = pipeline.assess(&gray_scan()).unwrap();
        assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
    }

    #[test]
    fn test_from_config_without_model_is_heuristic() {
        let pipeline = Pipeline::from_config(PipelineConfig::default()).unwrap();
        assert!(!pipeline.strategy().is_model_backed());
    }

    #[test]
    fn test_from_config_with_missing_artifact_falls_back() {
        let config = PipelineConfig {
            model_path: Some("does/not/exist.json".into()),
            ..Default::default()
        };
        let pipeline = Pipeline::from_config(config).unwrap();
        assert!(!pipeline.strategy().is_model_backed());
    }

    #[test]
    fn test_confidence_round_to_two_decimals() {
        let pipeline = model_pipeline(FixedClassifier::scoring(0.123456));
        let a = pipeline.assess(&gray_scan()).unwrap();
        assert_eq!(a.confidence, 12.35);
    }
}
