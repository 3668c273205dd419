//! Error handling for the Kiln CLI.
//!
//! - **Top-level errors** (`CliError`) represent broad categories of failures
//! - **Domain-specific errors** (`ConfigError`, `ServeError`) carry details and hints

pub mod miette;

pub use self::miette::cli_error_to_miette;

use kiln_core::{OptionsError, ResolveError, WatchError};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An option document (headers, compiler options) failed to load
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// Server startup or runtime errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] WatchError),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Explicit config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a kiln.config.json file or fix the --config path", .0.display())]
    NotFound(PathBuf),

    /// HTTP and live-reload servers would share a port
    #[error("Port {0} is used for both HTTP and live reload\n\nHint: Pass a different --ws-port")]
    PortConflict(u16),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Errors that turn a request into a 500 response.
#[derive(Debug, Error)]
pub enum ServeError {
    /// A request path that is not valid UTF-8 after percent-decoding
    #[error("Request path is not valid UTF-8: {0}")]
    InvalidPath(String),

    /// An option document needed for the response failed to load
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// Resolving or compiling the requested file failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from("kiln.config.json"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("kiln.config.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_config_error_port_conflict() {
        let msg = ConfigError::PortConflict(5000).to_string();
        assert!(msg.contains("Port 5000"));
        assert!(msg.contains("--ws-port"));
    }

    #[test]
    fn test_cli_error_from_config_error() {
        let cli_err: CliError = ConfigError::PortConflict(1).into();
        assert!(matches!(cli_err, CliError::Config(_)));
    }

    #[test]
    fn test_options_error_is_transparent() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CliError = OptionsError::Parse {
            path: PathBuf::from("headers.json"),
            source: parse,
        }
        .into();

        assert!(err.to_string().starts_with("Invalid options file headers.json"));
    }

    #[test]
    fn test_watch_error_keeps_path() {
        let err: CliError = WatchError::NoParent(PathBuf::from("/")).into();
        assert!(matches!(err, CliError::Watch(_)));
        assert_eq!(
            err.to_string(),
            "File watcher error: Cannot watch /: no parent directory"
        );
    }
}
