//! Tests for serializer configuration

use super::*;
use crate::render::RenderConfig;

#[test]
fn test_defaults() {
    let config = RenderConfig::default();
    assert_eq!(config.separator, "\n");
    assert_eq!(config.indent, Indent::None);
}

#[test]
fn test_builder() {
    let config = RenderConfig::new()
        .with_separator("#")
        .with_indent(Indent::Spaces(2));
    assert_eq!(config.separator, "#");
    assert_eq!(config.indent, Indent::Spaces(2));
}

#[test]
fn test_deserialize_space_as_width() {
    let config: RenderConfig = toml::from_str(r#"space = 2"#).unwrap();
    assert_eq!(config.indent, Indent::Spaces(2));
}

#[test]
fn test_deserialize_space_as_literal() {
    let config: RenderConfig = toml::from_str(r#"space = "\t""#).unwrap();
    assert_eq!(config.indent, Indent::Literal("\t".to_string()));
}

#[test]
fn test_deserialize_separator() {
    let config: RenderConfig = toml::from_str(r##"separator = "#""##).unwrap();
    assert_eq!(config.separator, "#");
    assert_eq!(config.indent, Indent::None);
}

#[test]
fn test_deserialize_indent_field_name() {
    let config: RenderConfig = toml::from_str(r#"indent = 4"#).unwrap();
    assert_eq!(config.indent, Indent::Spaces(4));
}

#[test]
fn test_deserialize_from_json_null_space() {
    let config: RenderConfig =
        serde_json::from_value(serde_json::json!({"space": null})).unwrap();
    assert_eq!(config.indent, Indent::None);
}

#[test]
fn test_negative_space_means_compact() {
    let config: RenderConfig = toml::from_str(r#"space = -2"#).unwrap();
    assert!(config.indent.is_compact());
}

#[test]
fn test_is_compact() {
    assert!(Indent::None.is_compact());
    assert!(Indent::Spaces(0).is_compact());
    assert!(Indent::Literal(String::new()).is_compact());
    assert!(!Indent::Spaces(2).is_compact());
    assert!(!Indent::Literal("\t".to_string()).is_compact());
}
