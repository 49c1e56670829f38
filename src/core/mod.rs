//! Core types for pipeline-structure
//!
//! This module holds the error types shared by every other module:
//!
//! - [`StructureError`] - Enumerated error types for resolution, extraction,
//!   validation and configuration failures
//! - [`TemplateValidationError`] / [`StructureValidationError`] - Aggregated
//!   validation results that carry every problem at once
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//!
//! Library functions return `Result<T, StructureError>`; the CLI works with
//! [`anyhow::Error`] and converts at the very end with [`user_friendly_error`].

pub mod error;

pub use error::{
    ErrorContext, StructureError, StructureValidationError, TemplateValidationError,
    ValidationProblem, user_friendly_error,
};

/// Result alias used throughout the library.
pub type Result<T, E = StructureError> = std::result::Result<T, E>;
