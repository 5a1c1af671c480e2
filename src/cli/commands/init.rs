//! Init command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::InitArgs;
use crate::model::{save_model, synthesize, ModelFormat};

pub fn run_init(args: InitArgs, level: LogLevel) -> Result<(), String> {
    let ext = args
        .output
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let format = ModelFormat::from_extension(ext)
        .ok_or_else(|| format!("Unsupported artifact extension: {ext:?} (use .json or .yaml)"))?;

    let model = synthesize(&args.name, args.seed);
    save_model(&model, &args.output, format).map_err(|e| format!("Save error: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!("Demo artifact '{}' written to {}", args.name, args.output.display()),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!("Seed: {} / layers: {}", args.seed, model.layers().len()),
    );

    Ok(())
}
