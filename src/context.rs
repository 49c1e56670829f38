//! Resolution context: the known key/value facts used to fill templates.
//!
//! A [`Context`] maps token names (`asset`, `sequence`, `version`, ...) to
//! string values. It is supplied by the caller and never mutated by the
//! resolver; operations that need to add facts (such as the entity type implied
//! by a template key) work on a clone.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::StructureError;

/// Context key holding the entity type (`asset` or `shot`).
pub const ENTITY_TYPE_KEY: &str = "entityType";
/// Context key holding the media type, which is also the name of a render template.
pub const MEDIA_TYPE_KEY: &str = "mediaType";

/// Template keys whose files belong to asset entities.
const ASSET_TEMPLATE_KEYS: &[&str] =
    &["assetScenefiles", "productFilesAssets", "renderFilesAssets", "playblastFilesAssets"];
/// Template keys whose files belong to shot entities.
const SHOT_TEMPLATE_KEYS: &[&str] =
    &["shotScenefiles", "productFilesShots", "renderFilesShots", "playblastFilesShots"];

/// The kind of entity a context describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    /// An asset (character, prop, environment, ...)
    Asset,
    /// A shot inside a sequence
    Shot,
}

impl EntityType {
    /// The value stored under [`ENTITY_TYPE_KEY`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Shot => "shot",
        }
    }

    /// The entity type implied by a template key, if any.
    ///
    /// ```rust
    /// use pipeline_structure::context::EntityType;
    ///
    /// assert_eq!(EntityType::for_template_key("shotScenefiles"), Some(EntityType::Shot));
    /// assert_eq!(EntityType::for_template_key("renderFilesAssets"), Some(EntityType::Asset));
    /// assert_eq!(EntityType::for_template_key("products"), None);
    /// ```
    pub fn for_template_key(key: &str) -> Option<Self> {
        if ASSET_TEMPLATE_KEYS.contains(&key) {
            Some(Self::Asset)
        } else if SHOT_TEMPLATE_KEYS.contains(&key) {
            Some(Self::Shot)
        } else {
            None
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File category used to pick an extension for sample contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFile {
    /// A scene file (`.hip`)
    Scene,
    /// An exported product (`.abc`)
    Product,
    /// A rendered image (`.exr`)
    Media,
}

impl SampleFile {
    const fn extension(self) -> &'static str {
        match self {
            Self::Scene => ".hip",
            Self::Product => ".abc",
            Self::Media => ".exr",
        }
    }
}

/// Token values used to resolve a template.
///
/// Keys are kept sorted so that serialized contexts and debug output are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether `key` is present (even with an empty value).
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Inserts or replaces a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies every entry of `other` into `self`, overwriting existing keys.
    pub fn merge(&mut self, other: &Self) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }

    /// The entity type this context describes.
    ///
    /// An explicit `entityType` wins; otherwise the presence of an `asset` or
    /// `shot` token decides. Contexts carrying both tokens are treated as
    /// assets. Older pipeline tooling left `@entity_path@` unresolved for such
    /// contexts instead; set `entityType` to pick shots.
    pub fn entity_type(&self) -> Option<EntityType> {
        match self.get(ENTITY_TYPE_KEY) {
            Some("asset") => return Some(EntityType::Asset),
            Some("shot") => return Some(EntityType::Shot),
            _ => {}
        }

        if self.contains("asset") {
            Some(EntityType::Asset)
        } else if self.contains("shot") {
            Some(EntityType::Shot)
        } else {
            None
        }
    }

    /// The media type, used to choose between render templates.
    pub fn media_type(&self) -> Option<&str> {
        self.get(MEDIA_TYPE_KEY)
    }

    /// Builds a context from a JSON object.
    ///
    /// Strings are taken verbatim, numbers and booleans are stringified and
    /// `null` becomes an empty string. A nested object contributes its `value`
    /// field, or its `path` field, when that field is a scalar. Arrays and
    /// objects without either field are rejected.
    ///
    /// ```rust
    /// use pipeline_structure::context::Context;
    /// use serde_json::json;
    ///
    /// let ctx = Context::from_json(&json!({
    ///     "project_path": {"path": "/proj"},
    ///     "frame": 1001,
    ///     "asset": "hero",
    /// }))?;
    /// assert_eq!(ctx.get("project_path"), Some("/proj"));
    /// assert_eq!(ctx.get("frame"), Some("1001"));
    /// # Ok::<(), pipeline_structure::core::StructureError>(())
    /// ```
    pub fn from_json(value: &serde_json::Value) -> Result<Self, StructureError> {
        let object = value.as_object().ok_or_else(|| StructureError::InvalidContext {
            reason: "expected a JSON object of token names to values".to_string(),
        })?;

        let mut ctx = Self::new();
        for (key, value) in object {
            let text = match value {
                serde_json::Value::Object(record) => record
                    .get("value")
                    .or_else(|| record.get("path"))
                    .and_then(scalar_to_string),
                other => scalar_to_string(other),
            };

            let text = text.ok_or_else(|| StructureError::InvalidContext {
                reason: format!("value of '{key}' is not a string, number, boolean or record"),
            })?;
            ctx.insert(key.clone(), text);
        }

        Ok(ctx)
    }

    /// Parses `key=value` assignments, as accepted by the CLI's `--set` flag.
    ///
    /// The value may contain further `=` characters; the key may not be empty.
    pub fn from_assignments<S: AsRef<str>>(assignments: &[S]) -> Result<Self, StructureError> {
        let mut ctx = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            match assignment.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    ctx.insert(key.trim(), value);
                }
                _ => {
                    return Err(StructureError::InvalidContext {
                        reason: format!("expected key=value, got '{assignment}'"),
                    });
                }
            }
        }
        Ok(ctx)
    }

    /// A representative context for previewing templates.
    ///
    /// Contains plausible values for every token of the default layout, plus
    /// asset or shot tokens and an extension matching `file`.
    pub fn sample(project_path: &str, entity: EntityType, file: SampleFile) -> Self {
        let mut ctx = Self::new()
            .with("project_path", project_path)
            .with("project_name", "myProject")
            .with("department", "modeling")
            .with("task", "body")
            .with("comment", "my-comment")
            .with("version", "v0001")
            .with("user", "mmu")
            .with("product", "charGEO")
            .with("frame", "1001")
            .with("aov", "beauty")
            .with("identifier", "main")
            .with("extension", file.extension());

        match entity {
            EntityType::Asset => {
                ctx.insert("asset", "alien");
                ctx.insert("asset_path", "character/alien");
            }
            EntityType::Shot => {
                ctx.insert("sequence", "seq01");
                ctx.insert("shot", "0010");
            }
        }

        ctx
    }
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null => Some(String::new()),
        _ => None,
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Self::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_type_prefers_explicit_value() {
        let ctx = Context::new().with("asset", "hero").with(ENTITY_TYPE_KEY, "shot");
        assert_eq!(ctx.entity_type(), Some(EntityType::Shot));
    }

    #[test]
    fn test_entity_type_asset_and_shot_tokens() {
        let ctx = Context::new().with("asset", "hero").with("shot", "0010");
        assert_eq!(ctx.entity_type(), Some(EntityType::Asset));
    }

    #[test]
    fn test_entity_type_from_tokens() {
        assert_eq!(Context::new().with("shot", "0010").entity_type(), Some(EntityType::Shot));
        assert_eq!(Context::new().with("asset", "hero").entity_type(), Some(EntityType::Asset));
        assert_eq!(Context::new().with("task", "anim").entity_type(), None);
    }

    #[test]
    fn test_from_json_rejects_arrays() {
        let err = Context::from_json(&json!({"asset": ["a", "b"]})).unwrap_err();
        assert!(err.to_string().contains("'asset'"));

        assert!(Context::from_json(&json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_from_json_null_and_bool() {
        let ctx = Context::from_json(&json!({"wedge": null, "local": true})).unwrap();
        assert_eq!(ctx.get("wedge"), Some(""));
        assert_eq!(ctx.get("local"), Some("true"));
    }

    #[test]
    fn test_from_assignments() {
        let ctx = Context::from_assignments(&["asset=hero", "comment=a=b"]).unwrap();
        assert_eq!(ctx.get("asset"), Some("hero"));
        assert_eq!(ctx.get("comment"), Some("a=b"));

        assert!(Context::from_assignments(&["novalue"]).is_err());
        assert!(Context::from_assignments(&["=value"]).is_err());
    }

    #[test]
    fn test_sample_context_shot_has_no_asset_tokens() {
        let ctx = Context::sample("/proj", EntityType::Shot, SampleFile::Media);
        assert_eq!(ctx.get("extension"), Some(".exr"));
        assert_eq!(ctx.get("shot"), Some("0010"));
        assert!(!ctx.contains("asset"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let ctx = Context::new().with("b", "2").with("a", "1");
        assert_eq!(serde_json::to_string(&ctx).unwrap(), r#"{"a":"1","b":"2"}"#);
    }
}
