//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::ValidateArgs;
use crate::model::load_model;

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    // Loading rebuilds every layer from the flat data, so a successful load
    // is a full structural validation.
    let model = load_model(&args.model).map_err(|e| format!("Invalid artifact: {e}"))?;

    if model.last_conv_layer().is_none() {
        return Err("Invalid artifact: no convolutional layer to target for saliency".to_string());
    }

    log(
        level,
        LogLevel::Normal,
        &format!("{} is a valid model artifact", args.model.display()),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!("{} layers, saliency target {}",
            model.layers().len(),
            model.last_conv_layer().unwrap_or("-")),
    );

    Ok(())
}
