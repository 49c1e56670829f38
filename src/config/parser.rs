//! Generic configuration parsing utilities.
//!
//! Project configuration files come in three formats, chosen by extension:
//!
//! | Extension | Format |
//! |-----------|--------|
//! | `.json` | JSON (`serde_json`) |
//! | `.yml`, `.yaml` | YAML (`serde_yaml`) |
//! | `.toml` | TOML (`toml`) |
//!
//! Errors carry the file path so a broken configuration is easy to find:
//!
//! ```text
//! Invalid project configuration in /proj/00_Pipeline/pipeline.json: expected `,` or `}` at line 4 column 5
//! ```

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::core::StructureError;

/// Supported configuration formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Detects the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Deserializes `content` in this format.
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Parse a configuration file into the specified type.
///
/// # Errors
///
/// - [`StructureError::ConfigNotFound`] if the file does not exist
/// - [`StructureError::ConfigParse`] for an unknown extension or invalid content
/// - [`StructureError::Io`] if the file cannot be read
pub fn parse_config<T>(path: &Path) -> Result<T, StructureError>
where
    T: DeserializeOwned,
{
    if !path.is_file() {
        return Err(StructureError::ConfigNotFound {
            path: path.display().to_string(),
        });
    }

    let format = ConfigFormat::from_path(path).ok_or_else(|| StructureError::ConfigParse {
        file: path.display().to_string(),
        reason: "unsupported file extension, expected .json, .yml, .yaml or .toml".to_string(),
    })?;

    let content = std::fs::read_to_string(path)?;
    format.parse(&content).map_err(|reason| StructureError::ConfigParse {
        file: path.display().to_string(),
        reason,
    })
}
