use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available Kiln subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve a directory, compiling scripts on request
    ///
    /// TypeScript, JSX and AssemblyScript files are compiled the first time they
    /// are requested. With --watch-files, changed files are recompiled on their
    /// next request and connected pages reload.
    Serve(ServeArgs),

    /// Validate configuration and option files
    ///
    /// Loads kiln.config.json and every configured option file and reports the
    /// first error without starting a server.
    Check(CheckArgs),
}

/// Option documents shared by `serve` and `check`.
#[derive(Args, Debug, Default, Clone)]
pub struct OptionFileArgs {
    /// Path to kiln.config.json
    ///
    /// If not provided, kiln.config.json in the current directory is used when
    /// present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON file mapping URL regexes to response headers
    ///
    /// Example: { "\\.wasm$": { "Cross-Origin-Opener-Policy": "same-origin" } }
    #[arg(long, value_name = "FILE")]
    pub headers_file: Option<PathBuf>,

    /// JSON file with TypeScript compiler options (module, target)
    #[arg(long, value_name = "FILE")]
    pub tsc_options_file: Option<PathBuf>,

    /// JSON file with AssemblyScript compiler flags
    #[arg(long, value_name = "FILE")]
    pub asc_options_file: Option<PathBuf>,
}

/// Arguments for the serve command
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Directory to serve [default: .]
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// HTTP port [default: 5000]
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Live-reload WebSocket port [default: 5001]
    #[arg(long, value_name = "PORT")]
    pub ws_port: Option<u16>,

    /// Address to bind both listeners to [default: 127.0.0.1]
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// SPA fallback document, relative to the root [default: index.html]
    #[arg(long, value_name = "FILE")]
    pub index: Option<PathBuf>,

    /// Return 404 for unknown paths instead of the index document
    #[arg(long)]
    pub disable_spa: bool,

    /// Watch served files and option files, reloading pages on change
    #[arg(short, long)]
    pub watch_files: bool,

    /// AssemblyScript compiler command [default: asc]
    ///
    /// Split on whitespace, so launchers such as "npx asc" work.
    #[arg(long, value_name = "COMMAND")]
    pub asc_compiler: Option<String>,

    #[command(flatten)]
    pub files: OptionFileArgs,
}

/// Arguments for the check command
#[derive(Args, Debug, Default, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub files: OptionFileArgs,
}
