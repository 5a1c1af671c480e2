//! Assess command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, AssessArgs, OutputFormat, PipelineConfig};
use crate::pipeline::{Assessment, Pipeline};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub fn run_assess(args: AssessArgs, level: LogLevel) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => load_config(path).map_err(|e| format!("Config error: {e}"))?,
        None => PipelineConfig::default(),
    };
    if args.model.is_some() {
        config.model_path = args.model.clone();
    }

    let pipeline = Pipeline::from_config(config).map_err(|e| format!("Pipeline error: {e}"))?;
    let scorer = if pipeline.strategy().is_model_backed() {
        "classifier"
    } else {
        "heuristic"
    };
    log(level, LogLevel::Verbose, &format!("Scoring strategy: {scorer}"));

    let bytes = std::fs::read(&args.image).map_err(|e| format!("Image read error: {e}"))?;
    let mut assessment = pipeline
        .assess(&bytes)
        .map_err(|e| format!("Assessment error: {e}"))?;

    // Writing the overlay out keeps the inline payload small. Without an
    // output path the payload stays inline in the printed record.
    if let Some(path) = &args.output {
        if let Some(payload) = assessment.visualization.take() {
            let png = STANDARD
                .decode(payload)
                .map_err(|e| format!("Visualization decode error: {e}"))?;
            std::fs::write(path, png).map_err(|e| format!("Visualization write error: {e}"))?;
            log(
                level,
                LogLevel::Normal,
                &format!("Visualization written to {}", path.display()),
            );
        }
    }

    print_assessment(&assessment, args.format, level)
}

fn print_assessment(
    assessment: &Assessment,
    format: OutputFormat,
    level: LogLevel,
) -> Result<(), String> {
    match format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, &format!("Prediction:  {}", assessment.prediction));
            log(
                level,
                LogLevel::Normal,
                &format!("Confidence:  {:.2}%", assessment.confidence),
            );
            log(level, LogLevel::Normal, &format!("Risk level:  {}", assessment.risk_level));
            log(level, LogLevel::Normal, &format!("Stroke type: {}", assessment.stroke_type));
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "Visualization: {}",
                    if assessment.visualization.is_some() { "available" } else { "none" }
                ),
            );
            log(level, LogLevel::Normal, "Recommendations:");
            for (i, rec) in assessment.recommendations.iter().enumerate() {
                log(level, LogLevel::Normal, &format!("  {}. {rec}", i + 1));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(assessment)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(assessment)
                .map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }

    Ok(())
}
