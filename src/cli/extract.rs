//! Extract token values from a concrete path.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{ContextArgs, OutputFormat, ProjectOptions, Target, Workspace, print_json, print_pairs};
use crate::pattern::{extract_tokens, extract_tokens_for_key};

/// Command to parse a path back into its tokens.
///
/// Tokens already known from the context (`--set`, `--context` and the
/// project's own `project_path`/`project_name`) must agree with the path and
/// are not printed again.
///
/// # Examples
///
/// ```bash
/// pstruct extract /proj/03_Production/Assets/char/hero assets
/// pstruct extract ./renders/beauty.1001.exr "@root@/@aov@.@frame@@extension@" --format json
/// ```
#[derive(Args, Debug)]
pub struct ExtractCommand {
    /// The path to parse
    pub path: String,

    /// Template key or pattern the path was built from
    pub target: String,

    #[command(flatten)]
    pub context: ContextArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ExtractCommand {
    pub fn execute(self, options: &ProjectOptions) -> Result<()> {
        let workspace = Workspace::load(options)?;
        let context = self.context.build(workspace.base_context())?;

        let tokens = match Target::parse(&self.target, &workspace.table)? {
            Target::Key(key) => extract_tokens_for_key(&self.path, key, &context, &workspace.table)?,
            Target::Pattern(pattern) => extract_tokens(&self.path, pattern, &context, &workspace.table)?,
        };

        match self.format {
            OutputFormat::Json => print_json(&tokens),
            OutputFormat::Text => {
                if tokens.is_empty() {
                    println!("{} '{}' does not match '{}'", "✗".red(), self.path, self.target);
                } else {
                    print_pairs(tokens.iter());
                }
                Ok(())
            }
        }
    }
}
