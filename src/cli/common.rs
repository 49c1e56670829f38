//! Shared helpers for CLI commands.
//!
//! Every command works on a [`Workspace`]: the effective template table plus
//! the project it came from, if one could be found. Commands that take a
//! `<key-or-pattern>` argument use [`Target`] to tell template keys from raw
//! patterns.

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{ConfigLocation, Project};
use crate::context::Context;
use crate::resolver::context_for_key;
use crate::structure::{StructurePreset, TemplateTable};
use crate::template;

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Layout preset selectable with `--preset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    /// The production layout
    #[default]
    Default,
    /// The older `03_Workflow` layout
    Legacy,
}

impl From<PresetArg> for StructurePreset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Default => Self::Default,
            PresetArg::Legacy => Self::Legacy,
        }
    }
}

/// Global options that select the project.
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    pub project: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub preset: PresetArg,
}

/// Context values given on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Set a token value (repeatable), e.g. `--set asset=hero`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub assignments: Vec<String>,

    /// Read token values from a JSON object file
    ///
    /// Values given with `--set` take precedence.
    #[arg(long = "context", value_name = "FILE")]
    pub context_file: Option<PathBuf>,
}

impl ContextArgs {
    /// The context from `--context` and `--set`, layered over `base`.
    pub fn build(&self, base: Context) -> Result<Context> {
        let mut context = base;

        if let Some(file) = &self.context_file {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read context file {}", file.display()))?;
            let json: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse context file {}", file.display()))?;
            context.merge(&Context::from_json(&json)?);
        }

        context.merge(&Context::from_assignments(&self.assignments)?);
        Ok(context)
    }
}

/// The effective template table and the project it belongs to.
#[derive(Debug)]
pub struct Workspace {
    pub project: Option<Project>,
    pub table: TemplateTable,
}

impl Workspace {
    /// Loads the workspace selected by the global options.
    ///
    /// `--config` wins over `--project`; without either the current directory
    /// and its ancestors are searched. Outside any project the preset table is
    /// used as-is.
    pub fn load(options: &ProjectOptions) -> Result<Self> {
        let preset = StructurePreset::from(options.preset);
        let location = ConfigLocation::from_env();

        let project = if let Some(config) = &options.config {
            Some(Project::from_config_file(config, preset, &location)?)
        } else if let Some(dir) = &options.project {
            Some(Project::load_with(dir, preset, &location)?)
        } else {
            let cwd = std::env::current_dir().context("Failed to determine the current directory")?;
            match location.find_project_root(&cwd) {
                Some(root) => Some(Project::load_with(&root, preset, &location)?),
                None => {
                    debug!("No project found above {}, using the {:?} preset", cwd.display(), preset);
                    None
                }
            }
        };

        let table = project.as_ref().map_or_else(|| preset.table(), |p| p.table().clone());
        Ok(Self {
            project,
            table,
        })
    }

    /// The project's seed context, or an empty one outside a project.
    pub fn base_context(&self) -> Context {
        self.project.as_ref().map(Project::context).unwrap_or_default()
    }

    /// The project root, if any.
    pub fn project_path(&self) -> Option<&Path> {
        self.project.as_ref().map(Project::path)
    }
}

/// A `<key-or-pattern>` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<'a> {
    /// A template key of the table
    Key(&'a str),
    /// A raw pattern or expression block
    Pattern(&'a str),
}

impl<'a> Target<'a> {
    /// Treats `text` as a key when the table has it, as a pattern otherwise.
    ///
    /// A bare word that is neither a key nor contains a placeholder is most
    /// likely a misspelled key, so it is reported as one.
    pub fn parse(text: &'a str, table: &TemplateTable) -> Result<Self> {
        if table.contains_key(text) {
            return Ok(Self::Key(text));
        }
        if template::template_keys(text).is_empty() && !text.contains(['/', '\\', '[']) {
            table.entry(text)?;
        }
        Ok(Self::Pattern(text))
    }

    /// The pattern text and the context to use with it.
    pub fn pattern_and_context(&self, table: &'a TemplateTable, context: &Context) -> Result<(&'a str, Context)> {
        match self {
            Self::Key(key) => Ok((table.entry(key)?.value.as_str(), context_for_key(key, context))),
            Self::Pattern(pattern) => Ok((*pattern, context.clone())),
        }
    }
}

/// Prints `value` as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints `key: value` pairs aligned on the colon.
pub fn print_pairs<'p>(pairs: impl IntoIterator<Item = (&'p str, &'p str)>) {
    let pairs: Vec<_> = pairs.into_iter().collect();
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in pairs {
        println!("{:width$}  {}", key.cyan(), value, width = width);
    }
}
