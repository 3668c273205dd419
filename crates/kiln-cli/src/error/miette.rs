//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use kiln_core::OptionsError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Options(e) => options_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert OptionsError to miette Report
pub fn options_error_to_miette(err: OptionsError) -> Report {
    let hint = match &err {
        OptionsError::Read { .. } => "Check that the file exists and is readable",
        OptionsError::Parse { .. } => "Option files must be a single JSON object",
        OptionsError::Watch { .. } => "Run without --watch-files or check the directory",
    };
    miette::miette!("{}\n\nHint: {}", err, hint)
}
