//! Sample project directories for tests.

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{DEFAULT_CONFIG_NAME, DEFAULT_PIPELINE_FOLDER};
use crate::context::Context;

/// Configuration of a project named `demo` that moves assets and shortens
/// shot folders.
pub const DEMO_CONFIG: &str = r#"{
    "globals": {"project_name": "demo"},
    "folder_structure": {
        "assets": {"value": "@project_path@/Assets/@asset_path@"},
        "shots": {"value": "@sequence_path@/sh_@shot@"}
    }
}"#;

/// A project rooted in a temporary directory, removed on drop.
#[derive(Debug)]
pub struct SampleProject {
    dir: TempDir,
}

impl SampleProject {
    /// An empty project directory without configuration.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temporary project directory")?;
        Ok(Self {
            dir,
        })
    }

    /// A project with [`DEMO_CONFIG`] at the default location.
    pub fn demo() -> Result<Self> {
        let project = Self::new()?;
        project.write_config(DEMO_CONFIG)?;
        Ok(project)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The project root with forward slashes, as it appears in resolved paths.
    pub fn path_str(&self) -> String {
        self.path().to_string_lossy().replace('\\', "/")
    }

    /// A context seeded with `project_path`.
    pub fn context(&self) -> Context {
        Context::new().with("project_path", self.path_str())
    }

    /// Writes `content` to `00_Pipeline/pipeline.json`.
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        self.write(&format!("{DEFAULT_PIPELINE_FOLDER}/{DEFAULT_CONFIG_NAME}"), content)
    }

    /// Writes `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Creates an empty file at `relative`.
    pub fn touch(&self, relative: &str) -> Result<PathBuf> {
        self.write(relative, "")
    }

    /// Creates a directory at `relative`.
    pub fn mkdir(&self, relative: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        fs::create_dir_all(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(path)
    }
}
