//! Filter stage configuration
//!
//! Subscription rules arrive in several legacy shapes, all of which must
//! keep parsing: a wildcard or falsy value ("report everything"), a single
//! tag, a flat tag list, or a table with separate `include` and `exclude`
//! selectors. Scalar tags may be written as numbers or booleans and are
//! coerced to their textual form.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

use crate::{StageError, StageResult};

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Subscription rules keyed by event type, as supplied by the user
pub type Subscriptions = IndexMap<String, SubscriptionRule>;

/// One subscription rule for an event type
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubscriptionRule {
    /// Accept every tag combination for this event type
    ///
    /// Written as `"*"`, `null`, `false`, or `0`.
    #[default]
    All,
    /// Accept records carrying this one tag
    Tag(String),
    /// Accept records carrying any of these tags (legacy shorthand,
    /// no exclusion capability)
    Tags(Vec<String>),
    /// Separate include and exclude tag selectors
    Detailed {
        /// Tags that admit a record; wildcard admits everything
        include: TagSelector,
        /// Tags that veto a record; wildcard/absent vetoes nothing
        exclude: TagSelector,
    },
}

impl SubscriptionRule {
    /// The accept-all rule
    pub fn all() -> Self {
        Self::All
    }

    /// A single included tag
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    /// Multiple included tags
    pub fn tags<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::Tags(tags.into_iter().map(Into::into).collect())
    }

    /// An include/exclude rule
    pub fn detailed(include: TagSelector, exclude: TagSelector) -> Self {
        Self::Detailed { include, exclude }
    }
}

/// A set of tags named by one side of a detailed rule
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TagSelector {
    /// Wildcard; resolves to the empty tag set
    #[default]
    Any,
    /// One tag
    One(String),
    /// Several tags
    Many(Vec<String>),
}

impl TagSelector {
    /// A single tag selector
    pub fn one(tag: impl Into<String>) -> Self {
        Self::One(tag.into())
    }

    /// A multi-tag selector
    pub fn many<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::Many(tags.into_iter().map(Into::into).collect())
    }
}

/// Configuration for the filter stage
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Whether the stage is enabled
    pub enabled: bool,
    /// Subscription rules keyed by event type
    pub events: Subscriptions,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            events: Subscriptions::new(),
        }
    }
}

impl FilterConfig {
    /// Create a config with no subscriptions (the stage forwards nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscription rule for an event type
    pub fn subscribe(mut self, event: impl Into<String>, rule: SubscriptionRule) -> Self {
        self.events.insert(event.into(), rule);
        self
    }

    /// Disable the stage
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Build a config from a dynamic TOML rules value
    ///
    /// The value must be a table of event-type keys. Anything else is a
    /// caller error, rejected at construction time.
    pub fn from_toml(events: &toml::Value) -> StageResult<Self> {
        match events {
            toml::Value::Table(_) => {
                let events = Subscriptions::deserialize(events.clone())
                    .map_err(|e| StageError::config(e.to_string()))?;
                Ok(Self {
                    enabled: true,
                    events,
                })
            }
            _ => Err(StageError::invalid_argument("events must be an object")),
        }
    }

    /// Build a config from a dynamic JSON rules value
    ///
    /// `null` is legal and yields a filter that forwards nothing; any other
    /// non-object value is a caller error.
    pub fn from_json(events: &serde_json::Value) -> StageResult<Self> {
        match events {
            serde_json::Value::Null => Ok(Self::default()),
            serde_json::Value::Object(_) => {
                let events = Subscriptions::deserialize(events.clone())
                    .map_err(|e| StageError::config(e.to_string()))?;
                Ok(Self {
                    enabled: true,
                    events,
                })
            }
            _ => Err(StageError::invalid_argument("events must be an object")),
        }
    }
}

/// Coerce a float to its textual tag form (`2.0` becomes `"2"`)
fn float_tag(value: f64) -> String {
    value.to_string()
}

impl<'de> Deserialize<'de> for SubscriptionRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RuleVisitor)
    }
}

struct RuleVisitor;

impl<'de> Visitor<'de> for RuleVisitor {
    type Value = SubscriptionRule;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a wildcard, a tag, a tag list, or an include/exclude table")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(SubscriptionRule::All)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(SubscriptionRule::All)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(RuleVisitor)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        if value {
            Ok(SubscriptionRule::Tag("true".to_string()))
        } else {
            Ok(SubscriptionRule::All)
        }
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        if value == 0 {
            Ok(SubscriptionRule::All)
        } else {
            Ok(SubscriptionRule::Tag(value.to_string()))
        }
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        if value == 0 {
            Ok(SubscriptionRule::All)
        } else {
            Ok(SubscriptionRule::Tag(value.to_string()))
        }
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if value == 0.0 {
            Ok(SubscriptionRule::All)
        } else {
            Ok(SubscriptionRule::Tag(float_tag(value)))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        if value == "*" {
            Ok(SubscriptionRule::All)
        } else {
            Ok(SubscriptionRule::Tag(value.to_string()))
        }
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut tags = Vec::new();
        while let Some(TagScalar(tag)) = seq.next_element()? {
            tags.push(tag);
        }
        Ok(SubscriptionRule::Tags(tags))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut include = TagSelector::Any;
        let mut exclude = TagSelector::Any;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "include" => include = map.next_value()?,
                "exclude" => exclude = map.next_value()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(SubscriptionRule::Detailed { include, exclude })
    }
}

impl<'de> Deserialize<'de> for TagSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SelectorVisitor)
    }
}

struct SelectorVisitor;

impl<'de> Visitor<'de> for SelectorVisitor {
    type Value = TagSelector;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a wildcard, a tag, or a tag list")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(TagSelector::Any)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(TagSelector::Any)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(SelectorVisitor)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        if value {
            Ok(TagSelector::One("true".to_string()))
        } else {
            Ok(TagSelector::Any)
        }
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        if value == 0 {
            Ok(TagSelector::Any)
        } else {
            Ok(TagSelector::One(value.to_string()))
        }
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        if value == 0 {
            Ok(TagSelector::Any)
        } else {
            Ok(TagSelector::One(value.to_string()))
        }
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if value == 0.0 {
            Ok(TagSelector::Any)
        } else {
            Ok(TagSelector::One(float_tag(value)))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        if value == "*" {
            Ok(TagSelector::Any)
        } else {
            Ok(TagSelector::One(value.to_string()))
        }
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut tags = Vec::new();
        while let Some(TagScalar(tag)) = seq.next_element()? {
            tags.push(tag);
        }
        Ok(TagSelector::Many(tags))
    }
}

/// A scalar tag coerced to its textual form
struct TagScalar(String);

impl<'de> Deserialize<'de> for TagScalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TagScalarVisitor)
    }
}

struct TagScalarVisitor;

impl<'de> Visitor<'de> for TagScalarVisitor {
    type Value = TagScalar;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, or boolean tag")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(TagScalar(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(TagScalar(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(TagScalar(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(TagScalar(float_tag(value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(TagScalar(value.to_string()))
    }
}
