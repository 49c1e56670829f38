//! Expression blocks in template values.
//!
//! A template value of the form `[expression,<source>]` computes its pattern
//! from the context instead of spelling it out. The source is written in a
//! small Python-compatible subset and must bind `template` to a pattern string
//! or a list of pattern strings:
//!
//! ```text
//! [expression,if context.get("mediaType") == "2drenders":
//!     template = "@renderversion_path@"
//! else:
//!     template = "@renderversion_path@/@aov@"]
//! ```
//!
//! Blocks are interpreted, never executed as code. The only thing they can
//! read is the resolution context, through `context.get("key")`,
//! `context.get("key", default)`, `context["key"]` and `"key" in context`.
//!
//! # Supported syntax
//!
//! | Construct | Example |
//! |-----------|---------|
//! | Assignment | `template = "@a@/@b@"` |
//! | Branching | `if` / `elif` / `else`, by indentation or on one line |
//! | Literals | `"text"`, `'text'`, `[...]`, `None`, `True`, `False`, integers |
//! | Operators | `==`, `!=`, `in`, `not in`, `and`, `or`, `not`, `+`, `( )` |
//! | Comments | `# ...` |

mod eval;
mod lexer;
mod parser;

use tracing::trace;

use crate::context::Context;
use crate::core::StructureError;

pub use eval::Value;

/// Opening sentinel of an expression block.
pub const EXPRESSION_PREFIX: &str = "[expression,";
/// Closing sentinel of an expression block.
pub const EXPRESSION_SUFFIX: &str = "]";

/// The variable an expression block must bind.
pub const RESULT_NAME: &str = "template";

/// Whether a template value is an expression block.
pub fn is_expression_block(value: &str) -> bool {
    value.len() >= EXPRESSION_PREFIX.len() + EXPRESSION_SUFFIX.len()
        && value.starts_with(EXPRESSION_PREFIX)
        && value.ends_with(EXPRESSION_SUFFIX)
}

/// The source between the sentinels, or `None` if `value` is not an expression block.
pub fn expression_body(value: &str) -> Option<&str> {
    if is_expression_block(value) {
        Some(&value[EXPRESSION_PREFIX.len()..value.len() - EXPRESSION_SUFFIX.len()])
    } else {
        None
    }
}

/// A parsed expression block, reusable across contexts.
#[derive(Debug, Clone)]
pub struct Expression {
    body: Vec<parser::Stmt>,
}

impl Expression {
    /// Parses expression source.
    ///
    /// Accepts either a full `[expression,...]` block or just the source between
    /// the sentinels.
    pub fn parse(text: &str) -> Result<Self, StructureError> {
        let source = expression_body(text).unwrap_or(text);
        let body = parser::parse(source).map_err(|e| StructureError::expression(e.to_string()))?;
        Ok(Self {
            body,
        })
    }

    /// Runs the block and returns the patterns bound to `template`.
    ///
    /// # Errors
    ///
    /// [`StructureError::ExpressionEval`] if evaluation fails, `template` is
    /// never bound, or it is bound to something other than a string or a list
    /// of strings.
    pub fn evaluate(&self, context: &Context) -> Result<Vec<String>, StructureError> {
        let mut scope = eval::Interpreter::new(context)
            .run(&self.body)
            .map_err(|e| StructureError::expression(e.to_string()))?;

        let patterns = match scope.remove(RESULT_NAME) {
            None => {
                return Err(StructureError::expression(format!(
                    "Make sure \"{RESULT_NAME}\" is defined."
                )));
            }
            Some(Value::Str(pattern)) => vec![pattern],
            Some(Value::List(items)) if items.is_empty() => {
                return Err(StructureError::expression(format!(
                    "\"{RESULT_NAME}\" is an empty list"
                )));
            }
            Some(Value::List(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Str(pattern) => Ok(pattern),
                    other => Err(StructureError::expression(format!(
                        "\"{RESULT_NAME}\" list items must be strings, got {other}"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(StructureError::expression(format!(
                    "\"{RESULT_NAME}\" must be a string or a list of strings, got {other}"
                )));
            }
        };

        trace!("Expression yielded {} pattern(s): {:?}", patterns.len(), patterns);
        Ok(patterns)
    }
}

/// Parses and evaluates an expression block in one step.
pub fn evaluate_template(text: &str, context: &Context) -> Result<Vec<String>, StructureError> {
    Expression::parse(text)?.evaluate(context)
}
