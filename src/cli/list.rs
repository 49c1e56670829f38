//! List the templates of the effective table.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::common::{OutputFormat, ProjectOptions, Workspace, print_json};
use crate::structure::{Requirement, TemplateEntry};

/// Command to show every template key with its label, symbolic key and value.
///
/// # Examples
///
/// ```bash
/// pstruct list
/// pstruct --preset legacy list --format json
/// ```
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ListItem<'a> {
    name: &'a str,
    #[serde(flatten)]
    entry: &'a TemplateEntry,
}

impl ListCommand {
    pub fn execute(self, options: &ProjectOptions) -> Result<()> {
        let workspace = Workspace::load(options)?;

        match self.format {
            OutputFormat::Json => {
                let items: Vec<ListItem<'_>> = workspace
                    .table
                    .iter()
                    .map(|(name, entry)| ListItem {
                        name,
                        entry,
                    })
                    .collect();
                print_json(&items)
            }
            OutputFormat::Text => {
                for (name, entry) in workspace.table.iter() {
                    let label = entry.label.as_deref().unwrap_or(name);
                    match &entry.key {
                        Some(key) => println!("{} {} {}", name.bold(), label.dimmed(), key.cyan()),
                        None => println!("{} {}", name.bold(), label.dimmed()),
                    }

                    if entry.is_expression() {
                        for line in entry.value.lines() {
                            println!("    {}", line.yellow());
                        }
                    } else {
                        println!("    {}", entry.value);
                    }

                    if !entry.requires.is_empty() {
                        let requires: Vec<String> = entry.requires.iter().map(Requirement::to_string).collect();
                        println!("    {} {}", "requires".dimmed(), requires.join(", "));
                    }
                }
                Ok(())
            }
        }
    }
}
