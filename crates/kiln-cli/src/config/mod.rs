//! Configuration for the dev server with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and `kiln.config.json`.
//! Priority: CLI > Environment > File > Defaults

mod loading;
mod tests;

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use loading::{CONFIG_FILE, ENV_PREFIX};

/// Dev server configuration - loaded from kiln.config.json, `KILN_*` or CLI args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServeConfig {
    /// Directory URLs are resolved against
    pub root: PathBuf,

    /// HTTP port
    pub port: u16,

    /// Live-reload WebSocket port
    pub ws_port: u16,

    /// Bind address for both listeners
    pub host: String,

    /// SPA fallback document, relative to `root`
    pub index: PathBuf,

    /// Return 404 for unknown paths instead of the index document
    pub disable_spa: bool,

    /// Watch served files and option files
    pub watch_files: bool,

    /// Custom header rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers_file: Option<PathBuf>,

    /// TypeScript compiler options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tsc_options_file: Option<PathBuf>,

    /// AssemblyScript compiler flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asc_options_file: Option<PathBuf>,

    /// AssemblyScript compiler command
    pub asc_compiler: String,

    /// File change events for the same path inside this window are dropped
    pub debounce_ms: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            port: 5000,
            ws_port: 5001,
            host: "127.0.0.1".to_string(),
            index: PathBuf::from(kiln_core::context::DEFAULT_INDEX),
            disable_spa: false,
            watch_files: false,
            headers_file: None,
            tsc_options_file: None,
            asc_options_file: None,
            asc_compiler: "asc".to_string(),
            debounce_ms: 100,
        }
    }
}

impl ServeConfig {
    /// Validate settings that serde cannot check.
    pub fn validate(&self) -> Result<()> {
        if self.port != 0 && self.port == self.ws_port {
            return Err(ConfigError::PortConflict(self.port).into());
        }

        if !self.root.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "root".to_string(),
                value: self.root.display().to_string(),
                hint: "The served root must be an existing directory".to_string(),
            }
            .into());
        }

        if self.asc_compiler.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ascCompiler".to_string(),
                value: self.asc_compiler.clone(),
                hint: "Set it to the AssemblyScript compiler, e.g. \"asc\" or \"npx asc\""
                    .to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// URL the HTTP server is reachable at.
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Settings given on the command line; `None` leaves lower layers in charge.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_spa: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_files: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tsc_options_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asc_options_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asc_compiler: Option<String>,

    /// Explicit config file; not a configuration key itself
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

impl From<&crate::cli::OptionFileArgs> for ConfigOverrides {
    fn from(files: &crate::cli::OptionFileArgs) -> Self {
        Self {
            headers_file: files.headers_file.clone(),
            tsc_options_file: files.tsc_options_file.clone(),
            asc_options_file: files.asc_options_file.clone(),
            config_file: files.config.clone(),
            ..Self::default()
        }
    }
}

impl From<&crate::cli::ServeArgs> for ConfigOverrides {
    fn from(args: &crate::cli::ServeArgs) -> Self {
        Self {
            root: args.root.clone(),
            port: args.port,
            ws_port: args.ws_port,
            host: args.host.clone(),
            index: args.index.clone(),
            // flags can only switch behavior on
            disable_spa: args.disable_spa.then_some(true),
            watch_files: args.watch_files.then_some(true),
            asc_compiler: args.asc_compiler.clone(),
            ..Self::from(&args.files)
        }
    }
}

impl From<&crate::cli::CheckArgs> for ConfigOverrides {
    fn from(args: &crate::cli::CheckArgs) -> Self {
        Self::from(&args.files)
    }
}
