//! Command-line interface for pipeline-structure (`pstruct`).
//!
//! Each command lives in its own module with its own argument struct and an
//! `execute` method taking the global [`ProjectOptions`].
//!
//! # Available Commands
//!
//! - `resolve` - Turn a template key or pattern into paths
//! - `extract` - Recover token values from a concrete path
//! - `matches` - List existing files that fit a template
//! - `validate` - Check every template against its requirements
//! - `list` - Show the templates of the effective table
//! - `preview` - Resolve a template with sample values
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--project <dir>` - Project root (default: search upwards from the current directory)
//! - `--config <file>` - Project configuration file, overriding `--project`
//! - `--preset default|legacy` - Layout the project's overrides are applied to
//!
//! # Example
//!
//! ```bash
//! # Where does the hero asset live?
//! pstruct resolve assets --set asset_path=char/hero
//!
//! # What is this file?
//! pstruct extract /proj/03_Production/Shots/sq010/sh0010/Scenefiles/lighting/main/sq010-sh0010_main_v0003.hip shotScenefiles
//!
//! # Is the project configuration sound?
//! pstruct --project /proj validate
//! ```

pub mod common;
mod extract;
mod list;
mod matches;
mod preview;
mod resolve;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use common::{PresetArg, ProjectOptions};

/// Main CLI application structure for pstruct.
#[derive(Parser, Debug)]
#[command(
    name = "pstruct",
    about = "Resolve, parse and validate project folder-structure templates",
    version,
    long_about = "pstruct turns @token@ path templates of a VFX/animation project into concrete paths, \
                  parses paths back into their tokens and validates the project's template configuration."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    ///
    /// Shows debug logging, including how templates are chosen and resolved.
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Project root directory
    ///
    /// Defaults to the nearest ancestor of the current directory that has a
    /// project configuration.
    #[arg(long, global = true, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Project configuration file
    ///
    /// The project root is the parent of the pipeline folder containing the
    /// file, or the file's own directory.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Built-in layout the project's overrides are applied to
    #[arg(long, global = true, value_enum, default_value = "default")]
    preset: PresetArg,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a template key or pattern into concrete paths.
    Resolve(resolve::ResolveCommand),

    /// Extract token values from a path.
    Extract(extract::ExtractCommand),

    /// List existing files that fit a template.
    Matches(matches::MatchesCommand),

    /// Validate the project's templates.
    Validate(validate::ValidateCommand),

    /// List the templates of the project.
    List(list::ListCommand),

    /// Preview a template with sample values.
    Preview(preview::PreviewCommand),
}

impl Cli {
    /// Initializes logging and runs the selected command.
    pub fn execute(self) -> Result<()> {
        init_logging(self.log_level());

        let options = ProjectOptions {
            project: self.project,
            config: self.config,
            preset: self.preset,
        };

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&options),
            Commands::Extract(cmd) => cmd.execute(&options),
            Commands::Matches(cmd) => cmd.execute(&options),
            Commands::Validate(cmd) => cmd.execute(&options),
            Commands::List(cmd) => cmd.execute(&options),
            Commands::Preview(cmd) => cmd.execute(&options),
        }
    }

    /// The default log filter implied by `--verbose` and `--quiet`.
    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

/// Installs the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` overrides `default_level`.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
