//! Shared helpers
//!
//! - [`paths`] - Lexical path normalization and extension splitting used by
//!   resolution and token extraction

pub mod paths;

pub use paths::{normalize_path, split_extension};
