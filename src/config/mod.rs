//! Project configuration.
//!
//! A project keeps its configuration next to its files, by default at
//! `<project>/00_Pipeline/pipeline.json`. The configuration names the project
//! and overrides template values of the built-in layout:
//!
//! ```json
//! {
//!     "globals": {"project_name": "myProject"},
//!     "folder_structure": {
//!         "assets": {"value": "@project_path@/Assets/@asset_path@"},
//!         "shots": {"value": "@sequence_path@/sh_@shot@"}
//!     }
//! }
//! ```
//!
//! The same structure can be written as YAML (`pipeline.yml`) or TOML
//! (`pipeline.toml`).
//!
//! # Configuration Location
//!
//! 1. `PSTRUCT_CONFIG_PATH` - path of the configuration relative to the project root
//! 2. `<PSTRUCT_PIPELINE_FOLDER>/<PSTRUCT_CONFIG_NAME>`, defaulting to `00_Pipeline/pipeline.json`
//! 3. `<project>/<config name>` when the file from step 1 or 2 does not exist
//!
//! # Modules
//!
//! - `parser` - Format detection and parsing with file context

mod parser;

pub use parser::{ConfigFormat, parse_config};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::context::Context;
use crate::core::StructureError;
use crate::resolver::PathResolver;
use crate::structure::{StructurePreset, TemplateTable};

/// Default folder holding pipeline configuration inside a project.
pub const DEFAULT_PIPELINE_FOLDER: &str = "00_Pipeline";
/// Default configuration file name.
pub const DEFAULT_CONFIG_NAME: &str = "pipeline.json";

/// Overrides the pipeline folder name.
pub const PIPELINE_FOLDER_ENV: &str = "PSTRUCT_PIPELINE_FOLDER";
/// Overrides the configuration file name.
pub const CONFIG_NAME_ENV: &str = "PSTRUCT_CONFIG_NAME";
/// Overrides the configuration path relative to the project root.
pub const CONFIG_PATH_ENV: &str = "PSTRUCT_CONFIG_PATH";

/// Contents of a project configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub globals: Globals,

    /// Template overrides; only `value` is taken from each entry.
    #[serde(default, skip_serializing_if = "TemplateTable::is_empty")]
    pub folder_structure: TemplateTable,
}

/// Project-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Globals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

/// Where a project's configuration file lives, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub pipeline_folder: String,
    pub config_name: String,
    /// Replaces `<pipeline_folder>/<config_name>` when set.
    pub relative_path: Option<PathBuf>,
}

impl Default for ConfigLocation {
    fn default() -> Self {
        Self {
            pipeline_folder: DEFAULT_PIPELINE_FOLDER.to_string(),
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            relative_path: None,
        }
    }
}

impl ConfigLocation {
    /// Defaults, overridden by the `PSTRUCT_*` environment variables.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            pipeline_folder: non_empty(PIPELINE_FOLDER_ENV).unwrap_or(defaults.pipeline_folder),
            config_name: non_empty(CONFIG_NAME_ENV).unwrap_or(defaults.config_name),
            relative_path: non_empty(CONFIG_PATH_ENV).map(PathBuf::from),
        }
    }

    /// The configuration path for `project`.
    ///
    /// Returns the preferred location even when nothing exists there, so
    /// callers can report it.
    pub fn config_path(&self, project: &Path) -> PathBuf {
        let preferred = match &self.relative_path {
            Some(relative) => project.join(relative),
            None => project.join(&self.pipeline_folder).join(&self.config_name),
        };

        if !preferred.is_file() {
            let flat = project.join(&self.config_name);
            if flat.is_file() {
                return flat;
            }
        }
        preferred
    }

    /// The project root a configuration file belongs to.
    ///
    /// A file inside the pipeline folder belongs to the folder's parent;
    /// any other file belongs to its own directory.
    pub fn project_root(&self, config_file: &Path) -> PathBuf {
        let dir = config_file.parent().unwrap_or_else(|| Path::new("."));
        let in_pipeline_folder =
            dir.file_name().is_some_and(|name| name.to_string_lossy() == self.pipeline_folder.as_str());
        match dir.parent() {
            Some(root) if in_pipeline_folder => root.to_path_buf(),
            _ => dir.to_path_buf(),
        }
    }

    /// Walks up from `start` to the first directory that has a configuration.
    pub fn find_project_root(&self, start: &Path) -> Option<PathBuf> {
        start.ancestors().find(|dir| self.config_path(dir).is_file()).map(Path::to_path_buf)
    }
}

/// A loaded project: its location, name and effective template table.
#[derive(Debug, Clone)]
pub struct Project {
    path: PathBuf,
    name: String,
    config_file: Option<PathBuf>,
    table: TemplateTable,
}

impl Project {
    /// Loads the project at `path`, applying its configuration to `preset`.
    ///
    /// # Errors
    ///
    /// [`StructureError::ConfigNotFound`] if the project has no configuration
    /// file, [`StructureError::ConfigParse`] if it cannot be parsed.
    pub fn load(path: &Path, preset: StructurePreset) -> Result<Self, StructureError> {
        Self::load_with(path, preset, &ConfigLocation::from_env())
    }

    /// [`load`](Self::load) with an explicit configuration location.
    pub fn load_with(
        path: &Path,
        preset: StructurePreset,
        location: &ConfigLocation,
    ) -> Result<Self, StructureError> {
        let config_file = location.config_path(path);
        let config: ProjectConfig = parse_config(&config_file)?;
        Ok(Self::from_config(path, Some(config_file), config, preset))
    }

    /// Loads the project a configuration file belongs to.
    pub fn from_config_file(
        config_file: &Path,
        preset: StructurePreset,
        location: &ConfigLocation,
    ) -> Result<Self, StructureError> {
        let config: ProjectConfig = parse_config(config_file)?;
        let root = location.project_root(config_file);
        Ok(Self::from_config(&root, Some(config_file.to_path_buf()), config, preset))
    }

    /// Builds a project from already-parsed configuration.
    pub fn from_config(
        path: &Path,
        config_file: Option<PathBuf>,
        config: ProjectConfig,
        preset: StructurePreset,
    ) -> Self {
        let mut table = preset.table();
        let applied = table.apply_overrides(&config.folder_structure);
        debug!("Applied {} template override(s) for project at {}", applied, path.display());

        let name = config.globals.project_name.unwrap_or_else(|| directory_name(path));
        Self {
            path: path.to_path_buf(),
            name,
            config_file,
            table,
        }
    }

    /// A project without a configuration file, using `table` as-is.
    pub fn with_table(path: &Path, table: TemplateTable) -> Self {
        Self {
            path: path.to_path_buf(),
            name: directory_name(path),
            config_file: None,
            table,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration file the project was loaded from, if any.
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    pub fn table(&self) -> &TemplateTable {
        &self.table
    }

    /// Mutable access, e.g. to register extra templates.
    pub fn table_mut(&mut self) -> &mut TemplateTable {
        &mut self.table
    }

    /// A resolver over this project's table.
    pub fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.table)
    }

    /// A context seeded with `project_path` and `project_name`.
    pub fn context(&self) -> Context {
        Context::new()
            .with("project_path", self.path.to_string_lossy().replace('\\', "/"))
            .with("project_name", self.name.clone())
    }
}

fn directory_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}
