//! Find existing files that fit a template.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::collections::BTreeMap;
use tracing::debug;

use super::common::{ContextArgs, OutputFormat, ProjectOptions, Target, Workspace, print_json};
use crate::pattern::{ExtractedTokens, find_matching_paths};
use crate::resolver::{PathResolver, ResolveOptions};

/// Command to list files on disk that fit a template.
///
/// The template is resolved with the context first; tokens left unresolved
/// act as wildcards spanning one path component each.
///
/// # Examples
///
/// ```bash
/// # Every scene file of one asset
/// pstruct matches assetScenefiles --set asset_path=char/hero --set asset=hero
///
/// # Every version folder of every product of a shot, as JSON
/// pstruct matches productVersions --set sequence=sq010 --set shot=sh0010 --format json
/// ```
#[derive(Args, Debug)]
pub struct MatchesCommand {
    /// Template key or pattern to match
    pub target: String,

    #[command(flatten)]
    pub context: ContextArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl MatchesCommand {
    pub fn execute(self, options: &ProjectOptions) -> Result<()> {
        let workspace = Workspace::load(options)?;
        let context = self.context.build(workspace.base_context())?;

        let target = Target::parse(&self.target, &workspace.table)?;
        let (pattern, context) = target.pattern_and_context(&workspace.table, &context)?;
        let candidates =
            PathResolver::new(&workspace.table).resolve_pattern(pattern, &context, ResolveOptions::default())?;

        // Fan-out templates can yield overlapping globs
        let mut found: BTreeMap<String, ExtractedTokens> = BTreeMap::new();
        for candidate in &candidates {
            debug!("Matching files against '{}'", candidate);
            for tokens in find_matching_paths(candidate)? {
                let path = tokens.path().unwrap_or_default().to_string();
                found.entry(path).or_insert(tokens);
            }
        }
        let found: Vec<ExtractedTokens> = found.into_values().collect();

        match self.format {
            OutputFormat::Json => print_json(&found),
            OutputFormat::Text => {
                if found.is_empty() {
                    println!("{} No files match '{}'", "✗".red(), self.target);
                }
                for tokens in &found {
                    let fields = tokens
                        .tokens()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    println!("{}  {}", tokens.path().unwrap_or_default(), fields.dimmed());
                }
                Ok(())
            }
        }
    }
}
