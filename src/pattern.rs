//! Token extraction and template matching.
//!
//! This module runs resolution backwards: given a concrete path and the
//! template it was (or may have been) built from, it recovers the token
//! values. It also enumerates existing files that fit a template.
//!
//! # Matching Rules
//!
//! A resolved skeleton such as `@project_path@/Assets/@asset_path@` is
//! compiled into a case-insensitive regular expression anchored at both ends:
//!
//! - Literal text is escaped and must appear verbatim (ignoring case)
//! - Each `@token@` becomes a capture group matching any text, as much as
//!   possible while the rest of the path still fits
//! - A decorated placeholder such as `@.(frame)@` is optional; when present its
//!   decorator text must match and only the inner value is captured
//! - The first occurrence of a token is captured under the token's name; later
//!   occurrences match anything and are discarded
//! - Tokens with a known value match that value literally and are not captured
//! - A trailing `@extension@` is handled by splitting the path's extension off
//!   by suffix, so multi-dot extensions like `.bgeo.sc` come out whole
//!
//! A path that does not fit yields an empty [`ExtractedTokens`]; this is not an
//! error, so callers can probe a path against several templates.
//!
//! # Examples
//!
//! ```rust
//! use pipeline_structure::context::Context;
//! use pipeline_structure::pattern::extract_tokens;
//! use pipeline_structure::structure::TemplateTable;
//!
//! let table = TemplateTable::new();
//! let context = Context::new().with("project_path", "/proj");
//! let tokens = extract_tokens(
//!     "/proj/Assets/Char/Hero",
//!     "@project_path@/Assets/@asset_path@",
//!     &context,
//!     &table,
//! )?;
//!
//! assert_eq!(tokens.get("asset_path"), Some("Char/Hero"));
//! assert_eq!(tokens.path(), Some("/proj/Assets/Char/Hero"));
//! // Tokens the context already supplied are not repeated
//! assert_eq!(tokens.get("project_path"), None);
//! # Ok::<(), pipeline_structure::core::StructureError>(())
//! ```

use glob::{MatchOptions, Pattern};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace, warn};

use crate::context::{Context, ENTITY_TYPE_KEY};
use crate::core::StructureError;
use crate::resolver::{PathResolver, ResolveOptions, context_for_key};
use crate::structure::TemplateTable;
use crate::template::{self, Segment};
use crate::utils::{normalize_path, split_extension};

/// Result key holding the matched path.
pub const PATH_KEY: &str = "path";
/// Result key holding the split-off extension.
pub const EXTENSION_KEY: &str = "extension";

const EXTENSION_PLACEHOLDER: &str = "@extension@";
const TEMP_GROUP_PREFIX: &str = "__temp__";

/// Token values recovered from a path.
///
/// Besides one entry per captured token, a successful match carries the
/// matched path under [`PATH_KEY`] and, when the template ends in
/// `@extension@` and the path has one, the extension under [`EXTENSION_KEY`].
/// A failed match is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractedTokens {
    values: BTreeMap<String, String>,
}

impl ExtractedTokens {
    /// Whether the path did not match.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of entries, including `path` and `extension`.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The matched path.
    pub fn path(&self) -> Option<&str> {
        self.get(PATH_KEY)
    }

    /// The split-off extension, including its leading dot.
    pub fn extension(&self) -> Option<&str> {
        self.get(EXTENSION_KEY)
    }

    /// Iterates over every entry in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates over captured tokens, without `path` and `extension`.
    pub fn tokens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, _)| *k != PATH_KEY && *k != EXTENSION_KEY)
    }

    /// The captured tokens and extension as a context, e.g. to resolve a
    /// sibling template of the matched file.
    pub fn into_context(self) -> Context {
        self.values.into_iter().filter(|(k, _)| k != PATH_KEY).collect()
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

/// A capture group of the compiled matcher.
#[derive(Debug, Clone)]
struct Capture {
    group: String,
    token: String,
}

/// A template compiled for matching paths.
///
/// Built from a skeleton: a pattern whose table references are already
/// expanded, so only literals and token placeholders remain.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    template: String,
    regex: Regex,
    captures: Vec<Capture>,
    strips_extension: bool,
}

impl TemplateMatcher {
    /// Compiles a skeleton.
    ///
    /// # Errors
    ///
    /// [`StructureError::TemplateSyntax`] if the skeleton has unbalanced delimiters.
    pub fn new(skeleton: &str) -> Result<Self, StructureError> {
        Self::with_known(skeleton, &Context::new())
    }

    /// Compiles a skeleton whose tokens in `known` must match their given value.
    ///
    /// Known values are matched literally (ignoring case) instead of being
    /// captured, so a later token may contain the template's own literal text.
    /// The `path` entry of `known` is ignored.
    ///
    /// # Errors
    ///
    /// [`StructureError::TemplateSyntax`] if the skeleton has unbalanced delimiters.
    pub fn with_known(skeleton: &str, known: &Context) -> Result<Self, StructureError> {
        template::check_balanced(skeleton)?;
        let template = normalize_path(skeleton);

        let (body, strips_extension) = match template.strip_suffix(EXTENSION_PLACEHOLDER) {
            Some(stem) => (stem, true),
            None => (template.as_str(), false),
        };

        let (expression, captures) = compile_expression(body, known)?;

        trace!("Compiled template '{}' to /{}/", template, expression);
        let regex = Regex::new(&expression).map_err(|e| StructureError::TemplateSyntax {
            pattern: skeleton.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            template,
            regex,
            captures,
            strips_extension,
        })
    }

    /// The normalized template this matcher was built from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether `path` fits the template.
    pub fn is_match(&self, path: &str) -> bool {
        let normalized = normalize_path(path);
        self.regex.is_match(self.stem(&normalized).0)
    }

    /// Extracts token values from `path`, or `None` if it does not fit.
    pub fn extract(&self, path: &str) -> Option<ExtractedTokens> {
        let normalized = normalize_path(path);
        let (stem, extension) = self.stem(&normalized);
        let caps = self.regex.captures(stem)?;

        let mut values = BTreeMap::new();
        for capture in &self.captures {
            let value = caps.name(&capture.group).map_or("", |m| m.as_str());
            values.insert(capture.token.clone(), value.to_string());
        }
        if !extension.is_empty() {
            values.insert(EXTENSION_KEY.to_string(), extension.to_string());
        }
        values.insert(PATH_KEY.to_string(), path.to_string());

        Some(ExtractedTokens {
            values,
        })
    }

    /// A glob pattern matching every path that may fit the template.
    ///
    /// Placeholders become `*`; runs of adjacent placeholders collapse into a
    /// single `*`. Literal text is escaped.
    pub fn glob_pattern(&self) -> String {
        let mut glob = String::new();
        let mut last_was_wildcard = false;
        // The template was checked for balance in `new`
        for segment in template::segments(&self.template).unwrap_or_default() {
            match segment {
                Segment::Literal(text) => {
                    glob.push_str(&Pattern::escape(text));
                    last_was_wildcard = false;
                }
                Segment::Placeholder(_) => {
                    if !last_was_wildcard {
                        glob.push('*');
                    }
                    last_was_wildcard = true;
                }
            }
        }
        glob
    }

    /// Enumerates existing paths fitting the template, sorted by path.
    ///
    /// Unreadable directory entries are skipped with a warning.
    pub fn find_matches(&self) -> Result<Vec<ExtractedTokens>, StructureError> {
        let glob_pattern = self.glob_pattern();
        debug!("Searching for template '{}' with glob '{}'", self.template, glob_pattern);

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };
        let entries =
            glob::glob_with(&glob_pattern, options).map_err(|e| StructureError::InvalidGlob {
                pattern: glob_pattern.clone(),
                reason: e.to_string(),
            })?;

        let mut matches = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping {}: {}", e.path().display(), e.error());
                    continue;
                }
            };

            let path = path.to_string_lossy();
            match self.extract(&path) {
                Some(tokens) => matches.push(tokens),
                None => trace!("Glob hit {} does not fit the template", path),
            }
        }

        matches.sort_by(|a, b| a.path().cmp(&b.path()));
        debug!("Found {} matches for template '{}'", matches.len(), self.template);
        Ok(matches)
    }

    fn stem<'p>(&self, normalized: &'p str) -> (&'p str, &'p str) {
        if self.strips_extension { split_extension(normalized) } else { (normalized, "") }
    }
}

/// Builds the anchored, case-insensitive expression for a skeleton body.
///
/// Captures are greedy, except directly before a decorated placeholder where
/// they are lazy so the optional decoration can match.
fn compile_expression(body: &str, known: &Context) -> Result<(String, Vec<Capture>), StructureError> {
    let segments = template::segments(body)?;
    let mut expression = String::from("(?i)^");
    let mut captures = Vec::new();
    let mut seen = HashSet::new();

    for (index, segment) in segments.iter().enumerate() {
        let placeholder = match segment {
            Segment::Literal(text) => {
                expression.push_str(&regex::escape(text));
                continue;
            }
            Segment::Placeholder(placeholder) => placeholder,
        };

        if let Some(value) = known_value(known, placeholder.name) {
            expression.push_str(&regex::escape(&placeholder.fill(&value)));
            continue;
        }

        let group = if seen.insert(placeholder.name) {
            let group = canonical_group_name(placeholder.name, index);
            captures.push(Capture {
                group: group.clone(),
                token: placeholder.name.to_string(),
            });
            group
        } else {
            temp_group_name(placeholder.name, index)
        };

        let lazy = matches!(segments.get(index + 1), Some(Segment::Placeholder(next)) if next.is_decorated());
        let any = if lazy { ".*?" } else { ".*" };

        if placeholder.is_decorated() {
            expression.push_str(&format!(
                "(?:{}(?P<{group}>{any}){})?",
                regex::escape(placeholder.prefix),
                regex::escape(placeholder.suffix)
            ));
        } else {
            expression.push_str(&format!("(?P<{group}>{any})"));
        }
    }
    expression.push('$');

    Ok((expression, captures))
}

fn known_value(known: &Context, token: &str) -> Option<String> {
    if token == PATH_KEY {
        return None;
    }
    let value = known.get(token)?;
    Some(if value.is_empty() { String::new() } else { normalize_path(value) })
}

fn is_group_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn canonical_group_name(token: &str, index: usize) -> String {
    if is_group_identifier(token) && !token.starts_with(TEMP_GROUP_PREFIX) {
        token.to_string()
    } else {
        format!("__token_{index}")
    }
}

fn temp_group_name(token: &str, index: usize) -> String {
    let token = if is_group_identifier(token) { token } else { "token" };
    format!("{TEMP_GROUP_PREFIX}{token}_{index}")
}

fn same_value(captured: &str, supplied: &str) -> bool {
    normalize_path(captured).to_lowercase() == normalize_path(supplied).to_lowercase()
}

/// Extracts token values from `path` according to `pattern`.
///
/// `pattern` is first resolved in skeleton mode, so table references such as
/// `@entity_path@` are expanded using `context` for tie-breaks; the first
/// candidate is used. Tokens that `context` already supplies must appear in
/// the path with that value (ignoring case) and are left out of the result.
///
/// # Errors
///
/// [`StructureError::TemplateSyntax`] for unbalanced patterns and
/// [`StructureError::ExpressionEval`] for failing expression blocks. A path
/// that does not fit is not an error.
pub fn extract_tokens(
    path: &str,
    pattern: &str,
    context: &Context,
    table: &TemplateTable,
) -> Result<ExtractedTokens, StructureError> {
    let skeleton = PathResolver::new(table)
        .resolve_pattern(pattern, context, ResolveOptions::skeleton())?
        .into_iter()
        .next()
        .unwrap_or_default();

    let matcher = TemplateMatcher::with_known(&skeleton, context)?;
    let Some(mut extracted) = matcher.extract(path) else {
        debug!("Path '{}' does not fit template '{}'", path, matcher.template());
        return Ok(ExtractedTokens::default());
    };

    for (token, supplied) in context.iter() {
        if token == PATH_KEY {
            continue;
        }
        if let Some(captured) = extracted.get(token) {
            if !same_value(captured, supplied) {
                debug!(
                    "Path '{}' has {}='{}' but the context supplies '{}'",
                    path, token, captured, supplied
                );
                return Ok(ExtractedTokens::default());
            }
            extracted.remove(token);
        }
    }

    Ok(extracted)
}

/// Extracts token values from `path` according to the template stored under `key`.
///
/// Like [`extract_tokens`], with the entity type implied by `key` added to the
/// context first.
///
/// # Errors
///
/// [`StructureError::UnknownTemplateKey`] if the table has no such key, plus
/// everything [`extract_tokens`] can fail with.
pub fn extract_tokens_for_key(
    path: &str,
    key: &str,
    context: &Context,
    table: &TemplateTable,
) -> Result<ExtractedTokens, StructureError> {
    let entry = table.entry(key)?;
    let context = context_for_key(key, context);
    let mut extracted = extract_tokens(path, &entry.value, &context, table)?;
    extracted.remove(ENTITY_TYPE_KEY);
    Ok(extracted)
}

/// Finds existing files fitting `pattern` and extracts their tokens.
///
/// `pattern` must already be resolved; placeholders left in it act as
/// wildcards. Each `*` only spans a single path component. Results are sorted
/// by path.
///
/// # Errors
///
/// [`StructureError::TemplateSyntax`] for unbalanced patterns and
/// [`StructureError::InvalidGlob`] if the derived glob is rejected.
pub fn find_matching_paths(pattern: &str) -> Result<Vec<ExtractedTokens>, StructureError> {
    TemplateMatcher::new(pattern)?.find_matches()
}
