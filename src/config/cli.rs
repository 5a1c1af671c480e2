//! CLI argument types

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ictus: stroke-scan assessment pipeline
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "ictus")]
#[command(author = "PAIML")]
#[command(version)]
#[command(about = "Stroke-scan risk assessment with Grad-CAM explainability")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Assess a scan image and print the result
    Assess(AssessArgs),

    /// Synthesize a demo classifier artifact with seeded random weights
    Init(InitArgs),

    /// Display a model artifact's metadata and layer table
    Info(InfoArgs),

    /// Validate a model artifact without running it
    Validate(ValidateArgs),
}

/// Output encoding for assessment results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Arguments for the assess command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct AssessArgs {
    /// Path to the scan image (PNG, JPEG, ...)
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Classifier artifact; omit to use the heuristic scorer
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Pipeline configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Write the visualization PNG to this path instead of inlining it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the init command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InitArgs {
    /// Output artifact path (.json or .yaml)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Model name stored in the artifact metadata
    #[arg(short, long, default_value = "stroke-cnn-demo")]
    pub name: String,

    /// Weight synthesis seed
    #[arg(short, long, default_value_t = 42)]
    pub seed: u64,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Model artifact path
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Model artifact path
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assess() {
        let cli = Cli::try_parse_from(["ictus", "assess", "scan.png", "--format", "json"]).unwrap();
        let Command::Assess(args) = cli.command else {
            panic!("expected assess command");
        };
        assert_eq!(args.image, PathBuf::from("scan.png"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.model.is_none());
    }

    #[test]
    fn test_parse_init_with_seed() {
        let cli = Cli::try_parse_from(["ictus", "init", "model.json", "--seed", "7"]).unwrap();
        let Command::Init(args) = cli.command else {
            panic!("expected init command");
        };
        assert_eq!(args.seed, 7);
        assert_eq!(args.name, "stroke-cnn-demo");
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["ictus", "info", "m.json", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_missing_command_fails() {
        assert!(Cli::try_parse_from(["ictus"]).is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yaml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
