//! Info command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::InfoArgs;
use crate::model::{load_model, LayerSpec};

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let model = load_model(&args.model).map_err(|e| format!("Model error: {e}"))?;
    let meta = model.metadata();

    log(level, LogLevel::Normal, "Model info:");
    println!();
    println!("Name: {}", meta.name);
    println!("Architecture: {}", meta.architecture);
    println!("Version: {}", meta.version);

    let state = model.to_state();
    println!("Parameters: {}", state.data.len());
    println!("Layers:");
    for spec in &state.layers {
        let detail = match spec {
            LayerSpec::Conv2d { kernel, in_channels, filters, .. } => {
                format!("conv {}x{} {in_channels}->{filters}", kernel[0], kernel[1])
            }
            LayerSpec::MaxPool2d { pool, .. } => format!("max pool {pool}x{pool}"),
            LayerSpec::GlobalAvgPool { .. } => "global average pool".to_string(),
            LayerSpec::Dense { inputs, units, .. } => format!("dense {inputs}->{units}"),
        };
        println!("  {:<28} {detail}", spec.name());
    }

    if let Some(layer) = model.last_conv_layer() {
        println!("Saliency target: {layer}");
    }

    Ok(())
}
