//! CLI command implementations

mod assess;
mod info;
mod init;
mod validate;

use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Assess(args) => assess::run_assess(args, log_level),
        Command::Init(args) => init::run_init(args, log_level),
        Command::Info(args) => info::run_info(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
    }
}
