//! Serializer configuration

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Pretty-print indentation
///
/// Deserializes from an integer (a width in spaces) or a string (a literal
/// indent unit), matching the `space` option of the stream API this stage
/// replaces. Zero, a negative number, or an empty string all mean compact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Indent {
    /// Compact output, no extra whitespace
    #[default]
    None,
    /// Indent by this many spaces per nesting level
    Spaces(usize),
    /// Indent by this literal string per nesting level
    Literal(String),
}

impl Indent {
    /// Whether this indent produces compact output
    pub fn is_compact(&self) -> bool {
        match self {
            Self::None => true,
            Self::Spaces(n) => *n == 0,
            Self::Literal(s) => s.is_empty(),
        }
    }
}

impl<'de> Deserialize<'de> for Indent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IndentVisitor)
    }
}

struct IndentVisitor;

impl<'de> Visitor<'de> for IndentVisitor {
    type Value = Indent;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an indent width or literal indent string")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Indent::None)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Indent::Spaces(value as usize))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        if value <= 0 {
            Ok(Indent::None)
        } else {
            Ok(Indent::Spaces(value as usize))
        }
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if value < 1.0 {
            Ok(Indent::None)
        } else {
            Ok(Indent::Spaces(value as usize))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(Indent::Literal(value.to_string()))
    }
}

/// Configuration for the serializer stage
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Separator appended after every rendered chunk
    pub separator: String,
    /// Pretty-print indentation (`space` in the legacy option name)
    #[serde(alias = "space")]
    pub indent: Indent,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            separator: "\n".to_string(),
            indent: Indent::None,
        }
    }
}

impl RenderConfig {
    /// Create a config with defaults: newline separator, compact output
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk separator
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Set the pretty-print indentation
    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }
}
