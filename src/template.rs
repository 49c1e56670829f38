//! Placeholder syntax shared by resolution, extraction and validation.
//!
//! A pattern alternates literal text and `@name@` placeholders. A placeholder
//! may carry a decorator, written as literal text around a parenthesized name:
//! `@_(wedge)@` contributes `_<wedge>` when `wedge` has a value and nothing
//! otherwise.

use crate::core::StructureError;

/// Placeholder delimiter.
pub const DELIMITER: char = '@';

/// A placeholder segment, with its decorator split off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// The text between the delimiters, e.g. `_(wedge)`
    pub raw: &'a str,
    /// The token name, e.g. `wedge`
    pub name: &'a str,
    /// Decorator text before the name
    pub prefix: &'a str,
    /// Decorator text after the name
    pub suffix: &'a str,
}

impl<'a> Placeholder<'a> {
    /// Splits a decorator like `_(wedge)` into prefix, name and suffix.
    pub fn parse(raw: &'a str) -> Self {
        if let Some(open) = raw.find('(') {
            if let Some(close) = raw[open..].find(')').map(|i| open + i) {
                return Self {
                    raw,
                    name: &raw[open + 1..close],
                    prefix: &raw[..open],
                    suffix: &raw[close + 1..],
                };
            }
        }
        Self {
            raw,
            name: raw,
            prefix: "",
            suffix: "",
        }
    }

    /// Whether the placeholder carries decorator text.
    pub fn is_decorated(&self) -> bool {
        self.name.len() != self.raw.len()
    }

    /// The value this placeholder contributes for a context value.
    ///
    /// A decorated placeholder wraps a non-empty value and drops an empty one.
    pub fn fill(&self, value: &str) -> String {
        if self.is_decorated() {
            if value.is_empty() { String::new() } else { format!("{}{value}{}", self.prefix, self.suffix) }
        } else {
            value.to_string()
        }
    }

    /// The placeholder as written in a pattern, e.g. `@_(wedge)@`.
    pub fn symbol(&self) -> String {
        format!("{DELIMITER}{}{DELIMITER}", self.raw)
    }
}

/// One piece of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder(Placeholder<'a>),
}

/// Whether `pattern` has an even number of delimiters.
pub fn is_balanced(pattern: &str) -> bool {
    pattern.matches(DELIMITER).count() % 2 == 0
}

/// Fails with [`StructureError::TemplateSyntax`] unless `pattern` is balanced.
pub fn check_balanced(pattern: &str) -> Result<(), StructureError> {
    if is_balanced(pattern) {
        Ok(())
    } else {
        Err(StructureError::TemplateSyntax {
            pattern: pattern.to_string(),
            message: "the pattern contains an uneven number of \"@\" characters".to_string(),
        })
    }
}

/// Splits a balanced pattern into literals and placeholders.
///
/// Empty literals and empty placeholders (`@@`) are dropped.
pub fn segments(pattern: &str) -> Result<Vec<Segment<'_>>, StructureError> {
    check_balanced(pattern)?;
    Ok(pattern
        .split(DELIMITER)
        .enumerate()
        .filter(|(_, piece)| !piece.is_empty())
        .map(|(index, piece)| {
            if index % 2 == 1 {
                Segment::Placeholder(Placeholder::parse(piece))
            } else {
                Segment::Literal(piece)
            }
        })
        .collect())
}

/// Raw placeholder names in order of appearance, duplicates included.
///
/// Tolerates unbalanced patterns; a trailing unterminated placeholder is ignored.
pub fn template_keys(pattern: &str) -> Vec<&str> {
    let pieces: Vec<&str> = pattern.split(DELIMITER).collect();
    let complete = if pieces.len() % 2 == 0 { pieces.len() - 1 } else { pieces.len() };
    pieces[..complete].iter().skip(1).step_by(2).copied().filter(|k| !k.is_empty()).collect()
}
