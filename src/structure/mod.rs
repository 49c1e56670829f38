//! Project template tables.
//!
//! A [`TemplateTable`] is the ordered set of named folder/file templates a
//! project uses to lay out its files on disk. Each [`TemplateEntry`] carries
//! the pattern itself, the symbolic key other templates can reference it by,
//! and the tokens it is required to contain.
//!
//! # Table Format
//!
//! Tables are stored in project configuration under `folder_structure`:
//!
//! ```json
//! {
//!     "assets": {
//!         "label": "Assets",
//!         "key": "@entity_path@",
//!         "value": "@project_path@/03_Production/Assets/@asset_path@",
//!         "requires": ["project_path", "asset_path"]
//!     },
//!     "shots": {
//!         "key": "@entity_path@",
//!         "value": "@sequence_path@/@shot@",
//!         "requires": [["sequence_path", "sequence"], "shot"]
//!     }
//! }
//! ```
//!
//! Declaration order is significant: when several entries share a symbolic key
//! and no tie-break rule applies, the first declared entry wins.

mod defaults;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use strsim::levenshtein;
use tracing::{debug, warn};

use crate::core::StructureError;

/// Maximum Levenshtein distance, as a percentage of the key length, for "did you mean" suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// A token requirement of a template.
///
/// Serialized as either a plain string or a list of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Requirement {
    /// The token must appear in the template.
    Token(String),
    /// At least one of these tokens must appear in the template.
    AnyOf(Vec<String>),
}

impl Requirement {
    /// Token names this requirement accepts, in declaration order.
    pub fn tokens(&self) -> &[String] {
        match self {
            Self::Token(token) => std::slice::from_ref(token),
            Self::AnyOf(tokens) => tokens,
        }
    }
}

impl fmt::Display for Requirement {
    /// Renders `@token@`, or `@a@ or @b@` for alternatives.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.tokens().iter().map(|t| format!("@{t}@")).collect();
        f.write_str(&rendered.join(" or "))
    }
}

impl From<&str> for Requirement {
    fn from(token: &str) -> Self {
        Self::Token(token.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for Requirement {
    fn from(tokens: [&str; N]) -> Self {
        Self::AnyOf(tokens.iter().map(|t| (*t).to_string()).collect())
    }
}

/// One named template of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// Human-readable name shown in listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// The placeholder other templates use to reference this one, e.g. `@entity_path@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// The pattern, or an expression block yielding patterns.
    pub value: String,

    /// Tokens the value must contain; checked by validation only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Requirement>,
}

impl TemplateEntry {
    /// Creates an entry with only a value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            label: None,
            key: None,
            value: value.into(),
            requires: Vec::new(),
        }
    }

    /// Sets the symbolic key, e.g. `@entity_path@`.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the token requirements.
    #[must_use]
    pub fn with_requires<R, I>(mut self, requires: I) -> Self
    where
        R: Into<Requirement>,
        I: IntoIterator<Item = R>,
    {
        self.requires = requires.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the value is an expression block.
    pub fn is_expression(&self) -> bool {
        crate::expression::is_expression_block(&self.value)
    }
}

/// Built-in layouts a project table starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StructurePreset {
    /// The current production layout.
    #[default]
    Default,
    /// The older layout (`03_Workflow`, `Rendering`, `shot_` prefixes) on the default keys.
    Legacy,
}

impl StructurePreset {
    /// Builds the table for this preset.
    pub fn table(self) -> TemplateTable {
        match self {
            Self::Default => defaults::default_table(),
            Self::Legacy => {
                let mut table = defaults::default_table();
                table.apply_overrides(&defaults::legacy_overrides());
                table
            }
        }
    }
}

/// Ordered mapping from template key to [`TemplateEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateTable {
    entries: Vec<(String, TemplateEntry)>,
}

impl TemplateTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default production layout. Shorthand for `StructurePreset::Default.table()`.
    pub fn default_structure() -> Self {
        StructurePreset::Default.table()
    }

    /// Returns the entry for `key`.
    pub fn get(&self, key: &str) -> Option<&TemplateEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    /// Returns the entry for `key` or an [`StructureError::UnknownTemplateKey`]
    /// with close-match suggestions.
    pub fn entry(&self, key: &str) -> Result<&TemplateEntry, StructureError> {
        self.get(key).ok_or_else(|| StructureError::UnknownTemplateKey {
            key: key.to_string(),
            suggestions: self.suggest_keys(key),
        })
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts an entry. An existing key is replaced in place, keeping its position;
    /// a new key is appended.
    pub fn insert(&mut self, key: impl Into<String>, entry: TemplateEntry) -> Option<TemplateEntry> {
        let key = key.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(existing, entry));
        }
        self.entries.push((key, entry));
        None
    }

    /// Registers an extra entry at runtime, e.g. from a plugin.
    ///
    /// Same as [`insert`](Self::insert); provided under the name used by
    /// project tooling.
    pub fn add_item(&mut self, key: impl Into<String>, entry: TemplateEntry) {
        self.insert(key, entry);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, entry: TemplateEntry) -> Self {
        self.insert(key, entry);
        self
    }

    /// Replaces the value of an existing template.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> Result<(), StructureError> {
        let suggestions = self.suggest_keys(key);
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, entry)) => {
                entry.value = value.into();
                Ok(())
            }
            None => Err(StructureError::UnknownTemplateKey {
                key: key.to_string(),
                suggestions,
            }),
        }
    }

    /// Overlays the values of `overrides` onto this table.
    ///
    /// Only `value` is taken from an override, and only for keys this table
    /// already has; symbolic keys and requirements always come from the base
    /// table. Unknown keys are skipped with a warning. Returns the number of
    /// values applied.
    pub fn apply_overrides(&mut self, overrides: &TemplateTable) -> usize {
        let mut applied = 0;
        for (key, entry) in overrides.iter() {
            match self.entries.iter_mut().find(|(k, _)| k == key) {
                Some((_, existing)) => {
                    if existing.value != entry.value {
                        debug!("Overriding template '{}' with '{}'", key, entry.value);
                    }
                    existing.value = entry.value.clone();
                    applied += 1;
                }
                None => warn!("Ignoring override for unknown template key '{}'", key),
            }
        }
        applied
    }

    /// Iterates over `(key, entry)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Template keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries whose symbolic key equals `symbolic_key` (e.g. `@entity_path@`), in
    /// declaration order.
    pub fn entries_with_key<'a, 'k>(
        &'a self,
        symbolic_key: &'k str,
    ) -> impl Iterator<Item = (&'a str, &'a TemplateEntry)> + use<'a, 'k> {
        self.iter().filter(move |(_, e)| e.key.as_deref() == Some(symbolic_key))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to three template keys similar to `key`, closest first.
    pub fn suggest_keys(&self, key: &str) -> Vec<String> {
        let lowered = key.to_lowercase();
        let mut scored: Vec<(usize, &str)> =
            self.keys().map(|k| (levenshtein(&lowered, &k.to_lowercase()), k)).collect();
        scored.sort_by_key(|(dist, _)| *dist);

        let limit = (key.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
        scored
            .into_iter()
            .filter(|(dist, _)| *dist <= limit)
            .take(3)
            .map(|(_, k)| k.to_string())
            .collect()
    }
}

impl Serialize for TemplateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, e)| (k, e)))
    }
}

impl<'de> Deserialize<'de> for TemplateTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = TemplateTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of template keys to template entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut table = TemplateTable::new();
                while let Some((key, entry)) = map.next_entry::<String, TemplateEntry>()? {
                    table.insert(key, entry);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

impl<K: Into<String>> FromIterator<(K, TemplateEntry)> for TemplateTable {
    fn from_iter<I: IntoIterator<Item = (K, TemplateEntry)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, e) in iter {
            table.insert(k, e);
        }
        table
    }
}
