//! Ictus CLI
//!
//! Single-binary entry point for the assessment pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Assess a scan with the heuristic scorer
//! ictus assess scan.png
//!
//! # Assess with a classifier artifact and save the overlay
//! ictus assess scan.png --model model.json --output overlay.png
//!
//! # Synthesize a demo classifier artifact
//! ictus init model.json --seed 42
//!
//! # Inspect or validate an artifact
//! ictus info model.json
//! ictus validate model.json
//! ```

use clap::Parser;
use ictus::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
