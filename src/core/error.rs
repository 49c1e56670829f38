//! Error handling for pipeline-structure
//!
//! This module provides the error types for template resolution, token
//! extraction, validation and project configuration, plus the user-facing
//! error reporting used by the `pstruct` CLI. The error system follows two
//! principles:
//! 1. **Strongly-typed errors** for precise handling by library callers
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`StructureError`] - Enumerated error types for all failure cases
//! - [`TemplateValidationError`] - Aggregate of every problem found in one template
//! - [`StructureValidationError`] - Aggregate of every failing template in a table
//! - [`ErrorContext`] - Wrapper that adds details and suggestions for display
//!
//! # Error Categories
//!
//! - **Template syntax**: [`StructureError::TemplateSyntax`] for unbalanced `@` delimiters
//! - **Expressions**: [`StructureError::ExpressionEval`] for expression blocks that fail
//!   to parse, fail to evaluate, or never bind `template`
//! - **Validation**: [`StructureError::TemplateValidation`] and
//!   [`StructureError::StructureValidation`] carry the full problem lists
//! - **Lookup**: [`StructureError::UnknownTemplateKey`], [`StructureError::CircularReference`]
//! - **Configuration**: [`StructureError::ConfigNotFound`], [`StructureError::ConfigParse`]
//!
//! A path that does not fit a template is *not* an error: extraction returns an
//! empty mapping so callers can probe a path against several templates.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pipeline_structure::core::{StructureError, user_friendly_error};
//!
//! let error = StructureError::TemplateSyntax {
//!     pattern: "@project_path@/Assets/@asset".to_string(),
//!     message: "the pattern contains an uneven number of \"@\" characters".to_string(),
//! };
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for pipeline-structure operations
///
/// # Error Categories
///
/// ## Templates
/// - [`TemplateSyntax`] - Unbalanced placeholder delimiters
/// - [`ExpressionEval`] - Expression block failed to parse or evaluate
/// - [`UnknownTemplateKey`] - Template key not present in the table
/// - [`CircularReference`] - Templates reference each other in a loop
///
/// ## Validation
/// - [`TemplateValidation`] - One template failed structural validation
/// - [`StructureValidation`] - One or more templates of a table failed validation
///
/// ## Configuration and I/O
/// - [`ConfigNotFound`] - Project configuration file missing
/// - [`ConfigParse`] - Project configuration could not be parsed
/// - [`InvalidContext`] - Context input could not be interpreted
/// - [`InvalidGlob`] - A resolved template produced an unusable glob
/// - [`Io`] - Standard I/O errors
///
/// [`TemplateSyntax`]: StructureError::TemplateSyntax
/// [`ExpressionEval`]: StructureError::ExpressionEval
/// [`UnknownTemplateKey`]: StructureError::UnknownTemplateKey
/// [`CircularReference`]: StructureError::CircularReference
/// [`TemplateValidation`]: StructureError::TemplateValidation
/// [`StructureValidation`]: StructureError::StructureValidation
/// [`ConfigNotFound`]: StructureError::ConfigNotFound
/// [`ConfigParse`]: StructureError::ConfigParse
/// [`InvalidContext`]: StructureError::InvalidContext
/// [`InvalidGlob`]: StructureError::InvalidGlob
/// [`Io`]: StructureError::Io
#[derive(Error, Debug)]
pub enum StructureError {
    /// A pattern has unbalanced `@` delimiters
    ///
    /// Raised for any pattern with an odd number of `@` characters. Malformed
    /// templates are a project configuration bug and are never repaired.
    #[error("Invalid template '{pattern}': {message}")]
    TemplateSyntax {
        /// The offending pattern
        pattern: String,
        /// Human-readable description of the problem
        message: String,
    },

    /// An expression block could not be parsed or evaluated
    ///
    /// Also raised when the block runs to completion without binding
    /// `template`, or binds it to something other than a string or a list of
    /// strings.
    #[error("Expression evaluation failed: {message}")]
    ExpressionEval {
        /// The underlying failure, including the line number when known
        message: String,
    },

    /// A template failed structural validation
    #[error(transparent)]
    TemplateValidation(#[from] TemplateValidationError),

    /// One or more templates of a table failed structural validation
    #[error(transparent)]
    StructureValidation(#[from] StructureValidationError),

    /// The requested template key does not exist in the table
    #[error("Unknown template key: '{key}'")]
    UnknownTemplateKey {
        /// The key that was requested
        key: String,
        /// Close matches from the table, best first
        suggestions: Vec<String>,
    },

    /// Templates reference each other through their symbolic keys in a loop
    #[error("Circular template reference: {chain}")]
    CircularReference {
        /// The reference chain, rendered as `a -> b -> a`
        chain: String,
    },

    /// The project configuration file does not exist
    #[error("Project configuration not found: {path}")]
    ConfigNotFound {
        /// The path that was searched
        path: String,
    },

    /// The project configuration file could not be parsed
    #[error("Invalid project configuration in {file}: {reason}")]
    ConfigParse {
        /// Path to the configuration file
        file: String,
        /// The parser's message
        reason: String,
    },

    /// Context input could not be interpreted
    #[error("Invalid context: {reason}")]
    InvalidContext {
        /// Why the context was rejected
        reason: String,
    },

    /// A resolved template produced a glob pattern the matcher rejects
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob {
        /// The glob pattern
        pattern: String,
        /// The glob parser's message
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StructureError {
    /// Shorthand for [`StructureError::ExpressionEval`].
    pub fn expression(message: impl Into<String>) -> Self {
        Self::ExpressionEval {
            message: message.into(),
        }
    }
}

/// A single problem found while validating a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationProblem {
    /// The pattern contains an uneven number of `@` characters.
    UnbalancedDelimiters,
    /// A required token (or every alternative of a requirement) is absent.
    ///
    /// The payload is the rendered requirement, e.g. `@shot@` or
    /// `@sequence_path@ or @sequence@`.
    MissingToken(String),
    /// Required tokens are present but not in the declared order.
    OutOfOrder {
        /// The declared order, rendered like [`ValidationProblem::MissingToken`]
        expected: Vec<String>,
    },
    /// An expression block failed to evaluate with an empty context.
    InvalidExpression(String),
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedDelimiters => {
                write!(f, "the path contains an uneven number of \"@\" characters")
            }
            Self::MissingToken(token) => write!(f, "required key is missing: {token}"),
            Self::OutOfOrder {
                expected,
            } => {
                write!(f, "the required keys are not in the correct order: {}", expected.join(", "))
            }
            Self::InvalidExpression(message) => write!(f, "invalid expression: {message}"),
        }
    }
}

/// Every problem found in one template, collected rather than failing fast.
///
/// A project settings screen can show all of them at once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Template '{template}' is invalid: {}", render_problems(.problems))]
pub struct TemplateValidationError {
    /// The template value that was validated
    pub template: String,
    /// Problems in discovery order
    pub problems: Vec<ValidationProblem>,
}

impl TemplateValidationError {
    /// Rendered requirements that are missing from the template.
    pub fn missing_tokens(&self) -> Vec<&str> {
        self.problems
            .iter()
            .filter_map(|p| match p {
                ValidationProblem::MissingToken(token) => Some(token.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether the required tokens appear in the wrong relative order.
    pub fn is_out_of_order(&self) -> bool {
        self.problems.iter().any(|p| matches!(p, ValidationProblem::OutOfOrder { .. }))
    }
}

fn render_problems(problems: &[ValidationProblem]) -> String {
    problems.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Validation failures for a whole template table, keyed by template key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} template(s) failed validation: {}", .errors.len(), failing_keys(.errors))]
pub struct StructureValidationError {
    /// Failing template keys in table order, each with its problems
    pub errors: Vec<(String, TemplateValidationError)>,
}

fn failing_keys(errors: &[(String, TemplateValidationError)]) -> String {
    errors.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>().join(", ")
}

/// User-friendly error wrapper with details and a suggestion
///
/// # Examples
///
/// ```rust,no_run
/// use pipeline_structure::core::ErrorContext;
///
/// let context = ErrorContext::new("Unknown template key: 'asset'")
///     .with_suggestion("Did you mean 'assets'?")
///     .with_details("Template keys are case-sensitive");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The main error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions are displayed in green in the terminal.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details are displayed in yellow in the terminal.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`StructureError`] anywhere in the error chain (so errors wrapped
/// with `anyhow::Context` keep their tailored suggestions) and common
/// [`std::io::Error`] kinds; everything else is rendered with its full cause
/// chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(structure_error) = error.chain().find_map(|e| e.downcast_ref::<StructureError>()) {
        let mut ctx = create_error_context(structure_error);
        let outer = error.to_string();
        if outer != ctx.message {
            ctx.message = format!("{outer}: {}", ctx.message);
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(format!("Permission denied: {io_error}"))
                    .with_suggestion("Check the permissions of the project directory and its configuration file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(format!("File not found: {io_error}"))
                    .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(message)
}

/// Map each [`StructureError`] variant to a message with tailored guidance.
fn create_error_context(error: &StructureError) -> ErrorContext {
    let ctx = ErrorContext::new(error.to_string());
    match error {
        StructureError::TemplateSyntax {
            ..
        } => ctx
            .with_suggestion("Wrap every placeholder in a pair of '@' characters, e.g. @project_path@/Assets/@asset_path@")
            .with_details("Placeholders are delimited by '@' on both sides, so a valid template always contains an even number of '@' characters"),

        StructureError::ExpressionEval {
            ..
        } => ctx
            .with_suggestion("Make sure the expression assigns \"template\" in every branch, e.g. template = \"@render_path@/@version@\"")
            .with_details("Expression blocks support assignments, if/elif/else, context.get(\"key\"), context[\"key\"], comparisons and string/list literals"),

        StructureError::TemplateValidation(validation) => ctx
            .with_details(render_problem_list(&validation.problems))
            .with_suggestion("Add the missing keys to the template in the order they are required"),

        StructureError::StructureValidation(validation) => {
            let details = validation
                .errors
                .iter()
                .map(|(key, err)| format!("{key}:\n{}", render_problem_list(&err.problems)))
                .collect::<Vec<_>>()
                .join("\n");
            ctx.with_details(details)
                .with_suggestion("Fix the listed templates in the project's folder_structure configuration")
        }

        StructureError::UnknownTemplateKey {
            suggestions,
            ..
        } => {
            if suggestions.is_empty() {
                ctx.with_suggestion("Run 'pstruct list' to see the available template keys")
            } else {
                ctx.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")))
            }
        }

        StructureError::CircularReference {
            ..
        } => ctx
            .with_suggestion("Change one of the templates so that it no longer refers back to itself through its symbolic key")
            .with_details("A template's value may reference other templates by their \"key\", but the references must not form a cycle"),

        StructureError::ConfigNotFound {
            ..
        } => ctx
            .with_suggestion("Pass --project <dir> or --config <file>, or run the command from inside a project")
            .with_details("The configuration is looked up at <project>/00_Pipeline/pipeline.json unless overridden by PSTRUCT_CONFIG_PATH"),

        StructureError::ConfigParse {
            file,
            ..
        } => ctx.with_suggestion(format!(
            "Check the syntax of {file}. The folder_structure section maps template keys to {{\"value\": ...}} objects"
        )),

        StructureError::InvalidContext {
            ..
        } => ctx.with_suggestion("Pass context values as --set key=value or a JSON object file via --context"),

        StructureError::InvalidGlob {
            ..
        } => ctx.with_suggestion("Check the literal parts of the template for unbalanced '[' or ']' characters"),

        StructureError::Io(_) => {
            ctx.with_suggestion("Check that the file or directory exists and is readable")
        }
    }
}

fn render_problem_list(problems: &[ValidationProblem]) -> String {
    problems.iter().map(|p| format!("  - {p}")).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_template_validation_error_lists_all_problems() {
        let err = TemplateValidationError {
            template: "@shot@/@sequence_path@".to_string(),
            problems: vec![
                ValidationProblem::MissingToken("@task@".to_string()),
                ValidationProblem::OutOfOrder {
                    expected: vec!["@sequence_path@".to_string(), "@shot@".to_string()],
                },
            ],
        };

        let message = err.to_string();
        assert!(message.contains("@task@"));
        assert!(message.contains("not in the correct order"));
        assert_eq!(err.missing_tokens(), vec!["@task@"]);
        assert!(err.is_out_of_order());
    }

    #[test]
    fn test_structure_validation_error_names_failing_keys() {
        let err = StructureValidationError {
            errors: vec![
                (
                    "assets".to_string(),
                    TemplateValidationError {
                        template: "@asset_path@".to_string(),
                        problems: vec![ValidationProblem::MissingToken("@project_path@".to_string())],
                    },
                ),
                (
                    "shots".to_string(),
                    TemplateValidationError {
                        template: "@shot".to_string(),
                        problems: vec![ValidationProblem::UnbalancedDelimiters],
                    },
                ),
            ],
        };

        assert_eq!(err.to_string(), "2 template(s) failed validation: assets, shots");
    }

    #[test]
    fn test_user_friendly_error_unknown_key_suggestions() {
        let err = StructureError::UnknownTemplateKey {
            key: "asset".to_string(),
            suggestions: vec!["assets".to_string()],
        };

        let ctx = user_friendly_error(anyhow::Error::from(err));
        assert_eq!(ctx.message, "Unknown template key: 'asset'");
        assert_eq!(ctx.suggestion.as_deref(), Some("Did you mean: assets?"));
    }

    #[test]
    fn test_user_friendly_error_keeps_outer_context() {
        let result: Result<(), StructureError> = Err(StructureError::TemplateSyntax {
            pattern: "@a".to_string(),
            message: "uneven".to_string(),
        });
        let err = result.context("Failed to resolve 'assets'").unwrap_err();

        let ctx = user_friendly_error(err);
        assert!(ctx.message.starts_with("Failed to resolve 'assets': "));
        assert!(ctx.message.contains("Invalid template '@a'"));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_user_friendly_error_generic_chain() {
        let err = anyhow::anyhow!("root cause").context("outer");
        let ctx = user_friendly_error(err);
        assert!(ctx.message.contains("outer"));
        assert!(ctx.message.contains("Caused by:"));
        assert!(ctx.message.contains("root cause"));
    }

    #[test]
    fn test_error_context_display_format() {
        let ctx = ErrorContext::new("boom").with_details("why").with_suggestion("fix it");
        assert_eq!(ctx.to_string(), "boom\nDetails: why\nSuggestion: fix it");
    }
}
