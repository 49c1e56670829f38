//! Choosing between templates that share a symbolic key.
//!
//! Several entries can answer to the same placeholder: `assets`, `shots` and
//! `textures` are all `@entity_path@`, and each render kind is a
//! `@render_path@`. The context decides which one applies.

use crate::context::{Context, EntityType};
use crate::structure::{TemplateEntry, TemplateTable};

/// Outcome of choosing a template for a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<'t> {
    /// Resolve through this entry.
    Entry(&'t str, &'t TemplateEntry),
    /// No entry answers to the placeholder, or the preferred one is absent.
    Unresolved,
}

/// Rule-specific preference for a placeholder, if any.
fn preferred_entry<'c>(placeholder: &str, context: &'c Context) -> Option<&'c str> {
    match placeholder {
        "entity_path" => match context.entity_type()? {
            EntityType::Asset => Some("assets"),
            EntityType::Shot => Some("shots"),
        },
        "render_path" => context.media_type(),
        _ => None,
    }
}

/// Picks the entry for placeholder `name` (without delimiters).
///
/// A rule that names a preferred entry restricts the choice to that entry;
/// otherwise the first entry in declaration order wins.
pub fn choose<'t>(table: &'t TemplateTable, name: &str, context: &Context) -> Choice<'t> {
    let symbolic = format!("@{name}@");
    let mut candidates = table.entries_with_key(&symbolic);

    let chosen = match preferred_entry(name, context) {
        Some(preferred) => candidates.find(|(key, _)| *key == preferred),
        None => candidates.next(),
    };

    match chosen {
        Some((key, entry)) => Choice::Entry(key, entry),
        None => Choice::Unresolved,
    }
}
