//! Template resolution.
//!
//! Turns patterns and template keys into concrete path strings using a
//! [`TemplateTable`] and a [`Context`]. Resolution is pure: it never touches
//! the filesystem and never mutates the caller's context.
//!
//! # Algorithm
//!
//! 1. An expression block is evaluated first; every pattern it yields is
//!    resolved independently and the results are concatenated.
//! 2. A plain pattern is split on `@` into literals and placeholders.
//! 3. Each placeholder is filled from the context when the context has the
//!    token. Otherwise the table entries whose symbolic key is `@name@` are
//!    considered, one is chosen by the rules in [`tie_break`], and its value
//!    is resolved recursively. A placeholder nothing answers to stays as
//!    `@name@`, or becomes the caller's fallback.
//! 4. A placeholder resolving to several candidates fans out the output. The
//!    result is the cross product in left-to-right order, with the leftmost
//!    placeholder varying slowest.
//!
//! # Example
//!
//! ```rust
//! use pipeline_structure::context::Context;
//! use pipeline_structure::resolver::PathResolver;
//! use pipeline_structure::structure::TemplateTable;
//!
//! let table = TemplateTable::default_structure();
//! let resolver = PathResolver::new(&table);
//! let context = Context::new()
//!     .with("project_path", "/proj")
//!     .with("asset_path", "Char/Hero")
//!     .with("asset", "Hero");
//!
//! let paths = resolver.resolve_template_key("assets", &context, None)?;
//! assert_eq!(paths, vec!["/proj/03_Production/Assets/Char/Hero"]);
//! # Ok::<(), pipeline_structure::core::StructureError>(())
//! ```

pub mod tie_break;

use tracing::{debug, trace};

use crate::context::{Context, ENTITY_TYPE_KEY, EntityType};
use crate::core::StructureError;
use crate::expression::{self, Expression};
use crate::structure::TemplateTable;
use crate::template::{self, Segment};
use crate::utils::normalize_path;

use tie_break::Choice;

/// Options for [`PathResolver::resolve_pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions<'a> {
    /// Substitute context values. When false only table references are
    /// expanded and every token stays a placeholder, which is what
    /// extraction needs to build its matcher.
    pub fill_context: bool,
    /// Replacement for placeholders that nothing answers to.
    pub fallback: Option<&'a str>,
}

impl Default for ResolveOptions<'_> {
    fn default() -> Self {
        Self {
            fill_context: true,
            fallback: None,
        }
    }
}

impl<'a> ResolveOptions<'a> {
    /// Expand table references only; leave every token as a placeholder.
    pub fn skeleton() -> Self {
        Self {
            fill_context: false,
            fallback: None,
        }
    }

    /// Sets the fallback for unresolvable placeholders.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Option<&'a str>) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Returns `context` with the entity type implied by `key` filled in.
///
/// Scene, product, render and playblast file templates exist once per entity
/// type; resolving one of them selects the matching `@entity_path@` branch.
pub fn context_for_key(key: &str, context: &Context) -> Context {
    let mut context = context.clone();
    if let Some(entity) = EntityType::for_template_key(key) {
        context.insert(ENTITY_TYPE_KEY, entity.as_str());
    }
    context
}

/// Resolves templates of one table.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'t> {
    table: &'t TemplateTable,
}

impl<'t> PathResolver<'t> {
    pub fn new(table: &'t TemplateTable) -> Self {
        Self {
            table,
        }
    }

    pub fn table(&self) -> &'t TemplateTable {
        self.table
    }

    /// Resolves a pattern or expression block into one or more strings.
    ///
    /// # Errors
    ///
    /// - [`StructureError::TemplateSyntax`] for a pattern with unbalanced `@`
    /// - [`StructureError::ExpressionEval`] for a failing expression block
    /// - [`StructureError::CircularReference`] for self-referencing templates
    pub fn resolve_pattern(
        &self,
        pattern: &str,
        context: &Context,
        options: ResolveOptions<'_>,
    ) -> Result<Vec<String>, StructureError> {
        self.resolve_inner(pattern, context, options, &mut Vec::new())
    }

    /// Resolves the template stored under `key`.
    ///
    /// The entity type implied by the key is added to a copy of the context,
    /// and every result is lexically normalized.
    ///
    /// # Errors
    ///
    /// [`StructureError::UnknownTemplateKey`] if the table has no such key, plus
    /// everything [`resolve_pattern`](Self::resolve_pattern) can fail with.
    pub fn resolve_template_key(
        &self,
        key: &str,
        context: &Context,
        fallback: Option<&str>,
    ) -> Result<Vec<String>, StructureError> {
        let entry = self.table.entry(key)?;
        let context = context_for_key(key, context);
        let options = ResolveOptions::default().with_fallback(fallback);

        let mut stack = vec![key.to_string()];
        let paths = self.resolve_inner(&entry.value, &context, options, &mut stack)?;
        debug!("Resolved template '{}' to {} path(s)", key, paths.len());

        Ok(paths.iter().map(|p| normalize_path(p)).collect())
    }

    /// The first path [`resolve_template_key`](Self::resolve_template_key) yields.
    pub fn resolve_one(
        &self,
        key: &str,
        context: &Context,
        fallback: Option<&str>,
    ) -> Result<String, StructureError> {
        Ok(self.resolve_template_key(key, context, fallback)?.into_iter().next().unwrap_or_default())
    }

    fn resolve_inner(
        &self,
        pattern: &str,
        context: &Context,
        options: ResolveOptions<'_>,
        stack: &mut Vec<String>,
    ) -> Result<Vec<String>, StructureError> {
        if expression::is_expression_block(pattern) {
            let mut resolved = Vec::new();
            for candidate in Expression::parse(pattern)?.evaluate(context)? {
                resolved.extend(self.resolve_plain(&candidate, context, options, stack)?);
            }
            return Ok(resolved);
        }

        self.resolve_plain(pattern, context, options, stack)
    }

    fn resolve_plain(
        &self,
        pattern: &str,
        context: &Context,
        options: ResolveOptions<'_>,
        stack: &mut Vec<String>,
    ) -> Result<Vec<String>, StructureError> {
        let mut outputs = vec![String::new()];

        for segment in template::segments(pattern)? {
            let pieces = match segment {
                Segment::Literal(text) => {
                    for output in &mut outputs {
                        output.push_str(text);
                    }
                    continue;
                }
                Segment::Placeholder(placeholder) => {
                    match context.get(placeholder.name).filter(|_| options.fill_context) {
                        Some(value) => vec![placeholder.fill(value)],
                        None => self.resolve_reference(placeholder.raw, context, options, stack)?,
                    }
                }
            };

            outputs = cross_product(&outputs, &pieces);
        }

        trace!("Resolved '{}' -> {:?}", pattern, outputs);
        Ok(outputs)
    }

    /// Resolves `@raw@` through the table's symbolic keys.
    fn resolve_reference(
        &self,
        raw: &str,
        context: &Context,
        options: ResolveOptions<'_>,
        stack: &mut Vec<String>,
    ) -> Result<Vec<String>, StructureError> {
        let (key, entry) = match tie_break::choose(self.table, raw, context) {
            Choice::Entry(key, entry) => (key, entry),
            Choice::Unresolved => {
                let literal = match options.fallback {
                    Some(fallback) => fallback.to_string(),
                    None => format!("@{raw}@"),
                };
                return Ok(vec![literal]);
            }
        };

        if stack.iter().any(|k| k == key) {
            let mut chain = stack.clone();
            chain.push(key.to_string());
            return Err(StructureError::CircularReference {
                chain: chain.join(" -> "),
            });
        }

        // The fallback only applies to the pattern the caller passed in
        let nested = ResolveOptions {
            fill_context: options.fill_context,
            fallback: None,
        };

        stack.push(key.to_string());
        let resolved = self.resolve_inner(&entry.value, context, nested, stack);
        stack.pop();
        resolved
    }
}

fn cross_product(prefixes: &[String], pieces: &[String]) -> Vec<String> {
    let mut combined = Vec::with_capacity(prefixes.len() * pieces.len());
    for prefix in prefixes {
        for piece in pieces {
            combined.push(format!("{prefix}{piece}"));
        }
    }
    combined
}

/// Resolves a pattern against `table`. See [`PathResolver::resolve_pattern`].
pub fn resolve_pattern(
    pattern: &str,
    context: &Context,
    table: &TemplateTable,
    options: ResolveOptions<'_>,
) -> Result<Vec<String>, StructureError> {
    PathResolver::new(table).resolve_pattern(pattern, context, options)
}

/// Resolves the template stored under `key`. See [`PathResolver::resolve_template_key`].
pub fn resolve_template_key(
    key: &str,
    context: &Context,
    table: &TemplateTable,
    fallback: Option<&str>,
) -> Result<Vec<String>, StructureError> {
    PathResolver::new(table).resolve_template_key(key, context, fallback)
}

/// The first path of [`resolve_template_key`].
pub fn resolve_one(
    key: &str,
    context: &Context,
    table: &TemplateTable,
    fallback: Option<&str>,
) -> Result<String, StructureError> {
    PathResolver::new(table).resolve_one(key, context, fallback)
}
