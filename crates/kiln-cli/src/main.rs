//! Kiln CLI entry point.
//!
//! Parses arguments, initializes logging and dispatches to the selected command.

use clap::Parser;
use kiln_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Serve(serve_args) => commands::serve_execute(serve_args).await,
        cli::Command::Check(check_args) => commands::check_execute(check_args).await,
    };

    // Convert CLI errors to miette diagnostics for reporting
    result.map_err(error::cli_error_to_miette)
}
