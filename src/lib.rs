//! pipeline-structure - project folder-structure templates
//!
//! A VFX/animation project keeps every file at a location described by a
//! template such as `@project_path@/03_Production/Assets/@asset_path@`. This
//! crate turns templates into concrete paths, parses concrete paths back into
//! their tokens, finds existing files that fit a template and validates a
//! project's template configuration.
//!
//! # Architecture Overview
//!
//! - A [`TemplateTable`](structure::TemplateTable) maps template keys
//!   (`assets`, `shotScenefiles`, ...) to entries holding a pattern or an
//!   expression block, the tokens the pattern must contain, and a symbolic
//!   key (`@entity_path@`) other templates can reference it by
//! - A [`Context`](context::Context) supplies token values
//! - Resolution, extraction and validation are pure functions of
//!   `(table, context)`; only glob matching reads the filesystem
//!
//! # Core Modules
//!
//! - [`resolver`] - Template resolution, symbolic references and tie-breaks
//! - [`pattern`] - Token extraction and glob matching
//! - [`expression`] - The sandboxed expression language of `[expression,...]` blocks
//! - [`validation`] - Requirement checks over templates and whole tables
//! - [`structure`] - Template tables and the built-in presets
//! - [`config`] - Project configuration loading
//! - [`context`] - Token values
//! - [`template`] - Placeholder syntax
//!
//! ## Supporting Modules
//! - [`cli`] - The `pstruct` command line
//! - [`core`] - Error types and user-friendly error rendering
//! - [`utils`] - Lexical path normalization and extension splitting
//!
//! # Example
//!
//! ```rust
//! use pipeline_structure::context::Context;
//! use pipeline_structure::pattern::extract_tokens_for_key;
//! use pipeline_structure::resolver::PathResolver;
//! use pipeline_structure::structure::TemplateTable;
//!
//! let table = TemplateTable::default_structure();
//! let context = Context::new()
//!     .with("project_path", "/proj")
//!     .with("sequence", "sq010")
//!     .with("shot", "sh0010");
//!
//! let shot = PathResolver::new(&table).resolve_one("shots", &context, None)?;
//! assert_eq!(shot, "/proj/03_Production/Shots/sq010/sh0010");
//!
//! let tokens = extract_tokens_for_key(&shot, "shots", &Context::new().with("project_path", "/proj"), &table)?;
//! assert_eq!(tokens.get("sequence"), Some("sq010"));
//! assert_eq!(tokens.get("shot"), Some("sh0010"));
//! # Ok::<(), pipeline_structure::core::StructureError>(())
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod core;
pub mod expression;
pub mod pattern;
pub mod resolver;
pub mod structure;
pub mod template;
pub mod utils;
pub mod validation;

// test_utils is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
