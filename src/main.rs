//! pstruct CLI entry point
//!
//! Parses the command line, runs the selected command and renders failures
//! with details and suggestions:
//! - `resolve` - Resolve a template key or pattern into paths
//! - `extract` - Extract token values from a path
//! - `matches` - List existing files that fit a template
//! - `validate` - Validate the project's templates
//! - `list` - List the project's templates
//! - `preview` - Preview a template with sample values

use clap::Parser;
use pipeline_structure::cli;
use pipeline_structure::core::user_friendly_error;

fn main() {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        user_friendly_error(e).display();
        std::process::exit(1);
    }
}
