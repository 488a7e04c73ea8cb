//! Event records
//!
//! An [`EventRecord`] wraps a [`Value`] and exposes the two fields the filter
//! stage reads: the `event` type string and the optional `tags` sequence.
//! The rest of the record is opaque payload that flows through untouched.

use crate::Value;

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;

/// One structured log/telemetry entry
///
/// Records are cheap to clone (the payload is a shared handle) and a clone
/// preserves identity, so forwarding a record forwards the record, not a
/// copy. Records without an `event` string field are never forwarded by the
/// filter; the serializer renders anything.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    value: Value,
}

impl EventRecord {
    /// Wrap an arbitrary value as a record
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Start building a record with the given event type
    pub fn builder(event: impl Into<String>) -> EventRecordBuilder {
        EventRecordBuilder::new(event)
    }

    /// The event type, when the record carries a string `event` field
    pub fn event(&self) -> Option<String> {
        match self.value.get("event") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The record's tags
    ///
    /// A missing or non-sequence `tags` field yields no tags. Non-string
    /// elements never match a compiled tag set, so they are dropped here.
    pub fn tags(&self) -> Vec<String> {
        let Some(tags) = self.value.get("tags") else {
            return Vec::new();
        };
        let Some(elements) = tags.elements() else {
            return Vec::new();
        };
        elements
            .into_iter()
            .filter_map(|element| match element {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// Borrow the underlying value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Unwrap into the underlying value
    pub fn into_value(self) -> Value {
        self.value
    }
}

impl From<Value> for EventRecord {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<serde_json::Value> for EventRecord {
    fn from(json: serde_json::Value) -> Self {
        Self::new(Value::from(json))
    }
}

/// Builder for event records
///
/// Field order in the rendered output follows build order: `event` first,
/// then payload fields, then `tags` (when any were added).
#[derive(Debug)]
pub struct EventRecordBuilder {
    map: Value,
    tags: Vec<String>,
}

impl EventRecordBuilder {
    fn new(event: impl Into<String>) -> Self {
        let map = Value::map();
        map.insert("event", Value::String(event.into()));
        Self {
            map,
            tags: Vec::new(),
        }
    }

    /// Add a single tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add multiple tags
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add a payload field
    pub fn field(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.map.insert(key, value.into());
        self
    }

    /// Finish the record
    pub fn build(self) -> EventRecord {
        if !self.tags.is_empty() {
            self.map.insert(
                "tags",
                Value::array_from(self.tags.into_iter().map(Value::String)),
            );
        }
        EventRecord::new(self.map)
    }
}
