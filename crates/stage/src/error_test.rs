//! Tests for stage errors

use super::*;

#[test]
fn test_invalid_argument_display() {
    let err = StageError::invalid_argument("events must be an object");
    assert!(err.to_string().contains("events must be an object"));
}

#[test]
fn test_config_display() {
    let err = StageError::config("unknown stage type 'frobnicate'");
    assert!(err.to_string().contains("invalid configuration"));
    assert!(err.to_string().contains("frobnicate"));
}
