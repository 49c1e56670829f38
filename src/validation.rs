//! Structural validation of template tables.
//!
//! Validation checks what resolution cannot: that each template contains the
//! tokens it is declared to require, in the declared order, and that expression
//! blocks evaluate. Every problem is collected instead of stopping at the
//! first, so a settings screen or `pstruct validate` can show all of them.

use serde::Serialize;
use tracing::debug;

use crate::context::Context;
use crate::core::{StructureValidationError, TemplateValidationError, ValidationProblem};
use crate::expression::{self, Expression};
use crate::structure::{Requirement, TemplateEntry, TemplateTable};
use crate::template;

/// Outcome of [`validate_expression`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Position of the first present alternative of `requirement` in `value`.
fn position(value: &str, requirement: &Requirement) -> Option<usize> {
    requirement.tokens().iter().find_map(|token| value.find(&format!("@{token}@")))
}

/// Checks `value` against the requirements of `entry`.
///
/// `value` is passed separately so a candidate value can be checked before it
/// replaces the entry's current one.
///
/// # Errors
///
/// A [`TemplateValidationError`] listing, in order: unbalanced delimiters,
/// every missing requirement, and misordering of the requirements that are
/// present.
pub fn validate_folder_key(value: &str, entry: &TemplateEntry) -> Result<(), TemplateValidationError> {
    let mut problems = Vec::new();

    if !template::is_balanced(value) {
        problems.push(ValidationProblem::UnbalancedDelimiters);
    }

    let mut positions = Vec::with_capacity(entry.requires.len());
    for requirement in &entry.requires {
        match position(value, requirement) {
            Some(index) => positions.push(index),
            None => problems.push(ValidationProblem::MissingToken(requirement.to_string())),
        }
    }

    if positions.windows(2).any(|pair| pair[1] < pair[0]) {
        problems.push(ValidationProblem::OutOfOrder {
            expected: entry.requires.iter().map(ToString::to_string).collect(),
        });
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(TemplateValidationError {
            template: value.to_string(),
            problems,
        })
    }
}

/// Evaluates an expression block with an empty context.
///
/// Accepts the block with or without its `[expression,` `]` sentinels.
pub fn validate_expression(text: &str) -> ExpressionValidation {
    match Expression::parse(text).and_then(|expr| expr.evaluate(&Context::new())) {
        Ok(_) => ExpressionValidation {
            valid: true,
            error: None,
        },
        Err(crate::core::StructureError::ExpressionEval {
            message,
        }) => ExpressionValidation {
            valid: false,
            error: Some(message),
        },
        Err(other) => ExpressionValidation {
            valid: false,
            error: Some(other.to_string()),
        },
    }
}

/// Validates every entry of `table`.
///
/// # Errors
///
/// A [`StructureValidationError`] with each failing key, in table order.
pub fn validate_structure(table: &TemplateTable) -> Result<(), StructureValidationError> {
    let mut errors = Vec::new();

    for (key, entry) in table.iter() {
        let mut problems = match validate_folder_key(&entry.value, entry) {
            Ok(()) => Vec::new(),
            Err(err) => err.problems,
        };

        if expression::is_expression_block(&entry.value) {
            let result = validate_expression(&entry.value);
            if let Some(error) = result.error {
                problems.push(ValidationProblem::InvalidExpression(error));
            }
        }

        if !problems.is_empty() {
            debug!("Template '{}' failed validation with {} problem(s)", key, problems.len());
            errors.push((
                key.to_string(),
                TemplateValidationError {
                    template: entry.value.clone(),
                    problems,
                },
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(StructureValidationError {
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::StructurePreset;

    fn shots_entry() -> TemplateEntry {
        TemplateEntry::new("").with_requires([
            Requirement::from(["sequence_path", "sequence"]),
            Requirement::from("shot"),
        ])
    }

    #[test]
    fn test_valid_value() {
        assert!(validate_folder_key("@sequence_path@/@shot@", &shots_entry()).is_ok());
        // The second alternative satisfies the requirement too
        assert!(validate_folder_key("/proj/@sequence@-@shot@", &shots_entry()).is_ok());
    }

    #[test]
    fn test_unbalanced() {
        let err = validate_folder_key("@sequence_path@/@shot", &shots_entry()).unwrap_err();
        assert_eq!(err.problems[0], ValidationProblem::UnbalancedDelimiters);
    }

    #[test]
    fn test_missing_alternatives_rendered_with_or() {
        let err = validate_folder_key("/proj/@shot@", &shots_entry()).unwrap_err();
        assert_eq!(err.missing_tokens(), vec!["@sequence_path@ or @sequence@"]);
        assert!(!err.is_out_of_order());
    }

    #[test]
    fn test_missing_and_misordered_together() {
        let entry = TemplateEntry::new("").with_requires(["project_path", "sequence", "shot"]);
        let err = validate_folder_key("@shot@/@project_path@", &entry).unwrap_err();

        assert_eq!(err.missing_tokens(), vec!["@sequence@"]);
        assert!(err.is_out_of_order());
        assert_eq!(err.problems.len(), 2);
        assert_eq!(
            err.problems[1],
            ValidationProblem::OutOfOrder {
                expected: vec!["@project_path@".into(), "@sequence@".into(), "@shot@".into()],
            }
        );
    }

    #[test]
    fn test_validate_expression() {
        let ok = validate_expression("[expression,template = '@a@']");
        assert!(ok.valid);
        assert_eq!(ok.error, None);

        let unbound = validate_expression("x = 1");
        assert!(!unbound.valid);
        assert_eq!(unbound.error.as_deref(), Some("Make sure \"template\" is defined."));

        let broken = validate_expression("if :\n  template = 'a'");
        assert!(!broken.valid);
        assert!(broken.error.unwrap().starts_with("line 1:"));
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(validate_structure(&StructurePreset::Default.table()).is_ok());
        assert!(validate_structure(&StructurePreset::Legacy.table()).is_ok());
    }

    #[test]
    fn test_validate_structure_reports_every_failing_key() {
        let mut table = TemplateTable::default_structure();
        table.set_value("assets", "@asset_path@/@project_path@").unwrap();
        table.set_value("aovs", "[expression,pass]").unwrap();

        let err = validate_structure(&table).unwrap_err();
        let keys: Vec<&str> = err.errors.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["assets", "aovs"]);

        let aovs = &err.errors[1].1;
        assert!(aovs.missing_tokens().contains(&"@renderversion_path@"));
        assert!(aovs.problems.iter().any(|p| matches!(p, ValidationProblem::InvalidExpression(_))));
    }
}
