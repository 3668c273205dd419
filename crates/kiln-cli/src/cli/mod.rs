//! Command-line interface definition for Kiln.
//!
//! # Command Structure
//!
//! - `kiln serve` - Start the dev server
//! - `kiln check` - Validate configuration and option files

mod commands;

use clap::Parser;

pub use commands::{CheckArgs, Command, OptionFileArgs, ServeArgs};

/// Kiln - a compile-on-request development server
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "A compile-on-request development server with live reload",
    long_about = "Kiln serves a directory over HTTP, compiling TypeScript, JSX and AssemblyScript\n\
                  on first request and caching the output until the source changes.\n\
                  Unknown routes fall back to index.html for single-page apps."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
