//! Tests for filter configuration parsing

use super::*;
use crate::filter::FilterConfig;

fn rule_from_json(json: serde_json::Value) -> SubscriptionRule {
    serde_json::from_value(json).unwrap()
}

#[test]
fn test_wildcard_and_falsy_shapes_parse_as_all() {
    for json in [
        serde_json::json!("*"),
        serde_json::json!(null),
        serde_json::json!(false),
        serde_json::json!(0),
    ] {
        assert_eq!(rule_from_json(json), SubscriptionRule::All);
    }
}

#[test]
fn test_single_string_parses_as_tag() {
    assert_eq!(
        rule_from_json(serde_json::json!("hapi")),
        SubscriptionRule::tag("hapi")
    );
}

#[test]
fn test_scalar_coercion() {
    // Truthy non-string scalars coerce to their textual tag form
    assert_eq!(
        rule_from_json(serde_json::json!(true)),
        SubscriptionRule::tag("true")
    );
    assert_eq!(
        rule_from_json(serde_json::json!(5)),
        SubscriptionRule::tag("5")
    );
    assert_eq!(
        rule_from_json(serde_json::json!(1.5)),
        SubscriptionRule::tag("1.5")
    );
}

#[test]
fn test_sequence_parses_as_tags_with_coercion() {
    assert_eq!(
        rule_from_json(serde_json::json!(["high", "medium", 1, true])),
        SubscriptionRule::tags(["high", "medium", "1", "true"])
    );
}

#[test]
fn test_detailed_shape() {
    assert_eq!(
        rule_from_json(serde_json::json!({"include": "request", "exclude": "debug"})),
        SubscriptionRule::detailed(TagSelector::one("request"), TagSelector::one("debug"))
    );

    assert_eq!(
        rule_from_json(serde_json::json!({"exclude": ["sensitive"]})),
        SubscriptionRule::detailed(TagSelector::Any, TagSelector::many(["sensitive"]))
    );

    // Wildcard or falsy include collapses to the accept-all selector
    assert_eq!(
        rule_from_json(serde_json::json!({"include": "*"})),
        SubscriptionRule::detailed(TagSelector::Any, TagSelector::Any)
    );
    assert_eq!(
        rule_from_json(serde_json::json!({"include": false, "exclude": 0})),
        SubscriptionRule::detailed(TagSelector::Any, TagSelector::Any)
    );
}

#[test]
fn test_detailed_shape_ignores_unknown_keys() {
    assert_eq!(
        rule_from_json(serde_json::json!({"include": "api", "comment": "keep"})),
        SubscriptionRule::detailed(TagSelector::one("api"), TagSelector::Any)
    );
}

#[test]
fn test_filter_config_from_toml_document() {
    let config: FilterConfig = toml::from_str(
        r#"
[events]
log = "*"
error = ["db", "auth"]
ops = { include = "cpu", exclude = ["noisy"] }
"#,
    )
    .unwrap();

    assert!(config.enabled);
    assert_eq!(config.events.len(), 3);
    assert_eq!(config.events["log"], SubscriptionRule::All);
    assert_eq!(config.events["error"], SubscriptionRule::tags(["db", "auth"]));
    assert_eq!(
        config.events["ops"],
        SubscriptionRule::detailed(TagSelector::one("cpu"), TagSelector::many(["noisy"]))
    );
}

#[test]
fn test_from_toml_rejects_non_table() {
    for value in [
        toml::Value::String("request".to_string()),
        toml::Value::Integer(1),
        toml::Value::Boolean(true),
    ] {
        let err = FilterConfig::from_toml(&value).unwrap_err();
        assert!(err.to_string().contains("events must be an object"));
    }
}

#[test]
fn test_from_toml_accepts_empty_table() {
    let config = FilterConfig::from_toml(&toml::Value::Table(toml::map::Map::new())).unwrap();
    assert!(config.events.is_empty());
}

#[test]
fn test_from_json_rejects_non_object() {
    for value in [
        serde_json::json!("request"),
        serde_json::json!(1),
        serde_json::json!(["log"]),
    ] {
        let err = FilterConfig::from_json(&value).unwrap_err();
        assert!(matches!(err, crate::StageError::InvalidArgument(_)));
        assert!(err.to_string().contains("events must be an object"));
    }
}

#[test]
fn test_from_json_null_is_legal() {
    let config = FilterConfig::from_json(&serde_json::Value::Null).unwrap();
    assert!(config.events.is_empty());
}

#[test]
fn test_from_json_object() {
    let config = FilterConfig::from_json(&serde_json::json!({
        "log": "*",
        "error": {"exclude": "sensitive"}
    }))
    .unwrap();

    assert_eq!(config.events.len(), 2);
    assert_eq!(config.events["log"], SubscriptionRule::All);
}

#[test]
fn test_builder() {
    let config = FilterConfig::new()
        .subscribe("log", SubscriptionRule::all())
        .subscribe("error", SubscriptionRule::tag("db"))
        .disabled();

    assert!(!config.enabled);
    assert_eq!(config.events.len(), 2);
}
