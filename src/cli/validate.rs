//! Validate the project's template table.

use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::common::{OutputFormat, ProjectOptions, Workspace, print_json};
use crate::validation::validate_structure;

/// Command to check every template against its requirements.
///
/// Exits with a non-zero status when any template is invalid, so it can gate
/// configuration changes in CI.
///
/// # Examples
///
/// ```bash
/// pstruct validate
/// pstruct --project /mnt/projects/dragon validate --format json
/// ```
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Validation results for JSON output.
#[derive(Debug, Default, Serialize)]
struct ValidationResults {
    valid: bool,
    templates: usize,
    errors: Vec<TemplateErrors>,
}

#[derive(Debug, Serialize)]
struct TemplateErrors {
    key: String,
    template: String,
    problems: Vec<String>,
}

impl ValidateCommand {
    pub fn execute(self, options: &ProjectOptions) -> Result<()> {
        let workspace = Workspace::load(options)?;

        let errors: Vec<TemplateErrors> = match validate_structure(&workspace.table) {
            Ok(()) => Vec::new(),
            Err(err) => err
                .errors
                .into_iter()
                .map(|(key, error)| TemplateErrors {
                    key,
                    template: error.template,
                    problems: error.problems.iter().map(ToString::to_string).collect(),
                })
                .collect(),
        };

        let results = ValidationResults {
            valid: errors.is_empty(),
            templates: workspace.table.len(),
            errors,
        };

        match self.format {
            OutputFormat::Json => print_json(&results)?,
            OutputFormat::Text => {
                if let Some(project) = &workspace.project {
                    println!("Project {} ({})", project.name().bold(), project.path().display());
                }
                for error in &results.errors {
                    println!("{} {}: {}", "✗".red(), error.key.bold(), error.template);
                    for problem in &error.problems {
                        println!("    - {problem}");
                    }
                }
                if results.valid {
                    println!("{} All {} templates are valid", "✓".green(), results.templates);
                }
            }
        }

        if results.valid {
            Ok(())
        } else {
            Err(anyhow!("{} of {} templates failed validation", results.errors.len(), results.templates))
        }
    }
}
