//! Preview a template with sample values.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use super::common::{OutputFormat, ProjectOptions, Target, Workspace, print_json};
use crate::context::{Context, EntityType, SampleFile};
use crate::resolver::{PathResolver, ResolveOptions};
use crate::utils::normalize_path;

/// Project path used for previews outside a project.
const SAMPLE_PROJECT_PATH: &str = "/projects/myProject";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum EntityArg {
    #[default]
    Asset,
    Shot,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FileArg {
    /// Scene file (`.hip`)
    #[default]
    Scene,
    /// Exported product (`.abc`)
    Product,
    /// Rendered image (`.exr`)
    Media,
}

/// Command to show what a template looks like with plausible values.
///
/// Useful while editing a project's `folder_structure`: every token of the
/// default layout gets a sample value, so a mistyped token stands out as a
/// leftover `@token@`.
///
/// # Examples
///
/// ```bash
/// pstruct preview productFilesShots --entity shot --file product
/// pstruct preview "@entity_path@/Export/@product@" --entity asset
/// ```
#[derive(Args, Debug)]
pub struct PreviewCommand {
    /// Template key or pattern to preview
    pub target: String,

    /// Entity the sample context describes
    #[arg(long, value_enum, default_value = "asset")]
    pub entity: EntityArg,

    /// File category deciding the sample extension
    #[arg(long, value_enum, default_value = "scene")]
    pub file: FileArg,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct PreviewOutput<'a> {
    target: &'a str,
    context: &'a Context,
    paths: &'a [String],
}

impl PreviewCommand {
    pub fn execute(self, options: &ProjectOptions) -> Result<()> {
        let workspace = Workspace::load(options)?;

        let project_path = workspace
            .project_path()
            .map_or_else(|| SAMPLE_PROJECT_PATH.to_string(), |p| p.to_string_lossy().replace('\\', "/"));
        let entity = match self.entity {
            EntityArg::Asset => EntityType::Asset,
            EntityArg::Shot => EntityType::Shot,
        };
        let file = match self.file {
            FileArg::Scene => SampleFile::Scene,
            FileArg::Product => SampleFile::Product,
            FileArg::Media => SampleFile::Media,
        };
        let context = Context::sample(&project_path, entity, file);

        let resolver = PathResolver::new(&workspace.table);
        let paths: Vec<String> = match Target::parse(&self.target, &workspace.table)? {
            Target::Key(key) => resolver.resolve_template_key(key, &context, None)?,
            Target::Pattern(pattern) => resolver
                .resolve_pattern(pattern, &context, ResolveOptions::default())?
                .iter()
                .map(|p| normalize_path(p))
                .collect(),
        };

        match self.format {
            OutputFormat::Json => print_json(&PreviewOutput {
                target: &self.target,
                context: &context,
                paths: &paths,
            }),
            OutputFormat::Text => {
                for path in &paths {
                    if path.contains('@') {
                        println!("{} {}", path, "(unresolved tokens)".yellow());
                    } else {
                        println!("{path}");
                    }
                }
                Ok(())
            }
        }
    }
}
