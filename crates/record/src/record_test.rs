//! Tests for event records

use super::*;

#[test]
fn test_builder_event_and_fields() {
    let record = EventRecord::builder("request").field("id", 1).build();

    assert_eq!(record.event().as_deref(), Some("request"));
    assert_eq!(record.value().get("id"), Some(Value::Int(1)));
    assert!(record.tags().is_empty());
}

#[test]
fn test_builder_tags() {
    let record = EventRecord::builder("log")
        .tag("server")
        .tags(["error", "hapi"])
        .build();

    assert_eq!(record.tags(), vec!["server", "error", "hapi"]);
}

#[test]
fn test_event_missing_or_non_string() {
    let no_event = EventRecord::new(Value::map());
    assert_eq!(no_event.event(), None);

    let numeric = Value::map();
    numeric.insert("event", Value::from(7));
    assert_eq!(EventRecord::new(numeric).event(), None);

    let scalar = EventRecord::new(Value::from("not a map"));
    assert_eq!(scalar.event(), None);
}

#[test]
fn test_tags_non_sequence_yields_none() {
    // A bare string in the tags field provides zero tags for matching
    let value = Value::map();
    value.insert("event", Value::from("request"));
    value.insert("tags", Value::from("hapi"));

    let record = EventRecord::new(value);
    assert!(record.tags().is_empty());
}

#[test]
fn test_tags_skip_non_string_elements() {
    let value = Value::map();
    value.insert("event", Value::from("log"));
    value.insert(
        "tags",
        Value::array_from([Value::from("debug"), Value::from(1), Value::Bool(true)]),
    );

    let record = EventRecord::new(value);
    assert_eq!(record.tags(), vec!["debug"]);
}

#[test]
fn test_clone_preserves_identity() {
    let record = EventRecord::builder("ops").field("load", 0.5).build();
    let forwarded = record.clone();

    forwarded.value().insert("annotated", Value::Bool(true));
    assert_eq!(record.value().get("annotated"), Some(Value::Bool(true)));
    assert_eq!(record, forwarded);
}

#[test]
fn test_from_json() {
    let record = EventRecord::from(serde_json::json!({
        "event": "request",
        "tags": ["api", "get"],
        "id": 9
    }));

    assert_eq!(record.event().as_deref(), Some("request"));
    assert_eq!(record.tags(), vec!["api", "get"]);
    assert_eq!(record.value().get("id"), Some(Value::Int(9)));
}
