//! Resolve a template key or pattern into concrete paths.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::debug;

use super::common::{ContextArgs, OutputFormat, ProjectOptions, Target, Workspace, print_json};
use crate::resolver::{PathResolver, ResolveOptions};
use crate::utils::normalize_path;

/// Command to resolve a template into paths.
///
/// # Examples
///
/// ```bash
/// # Resolve a template key of the project
/// pstruct resolve assets --set asset_path=char/hero
///
/// # Resolve a raw pattern, replacing unknown tokens
/// pstruct resolve "@project_path@/@department@" --fallback "*"
///
/// # Every candidate of a fan-out template, as JSON
/// pstruct resolve aovs --context shot.json --all --format json
/// ```
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Template key (e.g. `assets`) or pattern (e.g. `@project_path@/tex`)
    pub target: String,

    #[command(flatten)]
    pub context: ContextArgs,

    /// Replacement for placeholders that cannot be resolved
    #[arg(long)]
    pub fallback: Option<String>,

    /// Print every candidate instead of only the first
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    target: &'a str,
    paths: &'a [String],
}

impl ResolveCommand {
    pub fn execute(self, options: &ProjectOptions) -> Result<()> {
        let workspace = Workspace::load(options)?;
        let context = self.context.build(workspace.base_context())?;
        let resolver = PathResolver::new(&workspace.table);
        let fallback = self.fallback.as_deref();

        let mut paths = match Target::parse(&self.target, &workspace.table)? {
            Target::Key(key) => resolver.resolve_template_key(key, &context, fallback)?,
            Target::Pattern(pattern) => resolver
                .resolve_pattern(pattern, &context, ResolveOptions::default().with_fallback(fallback))?
                .iter()
                .map(|p| normalize_path(p))
                .collect(),
        };
        debug!("'{}' resolved to {} candidate(s)", self.target, paths.len());

        if !self.all {
            paths.truncate(1);
        }

        match self.format {
            OutputFormat::Json => print_json(&ResolveOutput {
                target: &self.target,
                paths: &paths,
            }),
            OutputFormat::Text => {
                for path in &paths {
                    println!("{path}");
                }
                Ok(())
            }
        }
    }
}
