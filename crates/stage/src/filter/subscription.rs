//! Subscription compilation and tag matching
//!
//! Rules compile once, at stage construction, into a lookup table the hot
//! path reads without allocation. Event-type keys are lower-cased on both
//! sides of the lookup; tag comparison stays case-sensitive.

use std::collections::{HashMap, HashSet};

use super::config::{SubscriptionRule, Subscriptions, TagSelector};

#[cfg(test)]
#[path = "subscription_test.rs"]
mod tests;

/// Compiled per-event-type tag sets
///
/// Invariant: an EMPTY include set accepts every tag combination, including
/// records with no tags at all. A non-empty include set requires at least
/// one matching tag. The exclude set only ever vetoes; empty means nothing
/// is vetoed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl TagFilter {
    fn from_rule(rule: &SubscriptionRule) -> Self {
        match rule {
            SubscriptionRule::All => Self::default(),
            SubscriptionRule::Tag(tag) => Self {
                include: HashSet::from([tag.clone()]),
                exclude: HashSet::new(),
            },
            SubscriptionRule::Tags(tags) => Self {
                include: tags.iter().cloned().collect(),
                exclude: HashSet::new(),
            },
            SubscriptionRule::Detailed { include, exclude } => Self {
                include: resolve(include),
                exclude: resolve(exclude),
            },
        }
    }

    /// The included tag set; empty means accept-all
    pub fn include(&self) -> &HashSet<String> {
        &self.include
    }

    /// The excluded tag set; empty means nothing is excluded
    pub fn exclude(&self) -> &HashSet<String> {
        &self.exclude
    }

    /// Whether a record carrying these tags should be forwarded
    pub fn accepts(&self, tags: &[String]) -> bool {
        let include_match =
            self.include.is_empty() || tags.iter().any(|tag| self.include.contains(tag));
        let exclude_match =
            !self.exclude.is_empty() && tags.iter().any(|tag| self.exclude.contains(tag));
        include_match && !exclude_match
    }
}

fn resolve(selector: &TagSelector) -> HashSet<String> {
    match selector {
        TagSelector::Any => HashSet::new(),
        TagSelector::One(tag) => HashSet::from([tag.clone()]),
        TagSelector::Many(tags) => tags.iter().cloned().collect(),
    }
}

/// The compiled subscription table
///
/// A key present in the table means the event type is subscribed; absence
/// means records of that type are never forwarded. Built once and read-only
/// for the lifetime of the owning stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledSubscription {
    events: HashMap<String, TagFilter>,
}

impl CompiledSubscription {
    /// Compile user-supplied rules
    ///
    /// Compiling an empty rules mapping yields an empty table, not an error.
    pub fn compile(rules: &Subscriptions) -> Self {
        let events = rules
            .iter()
            .map(|(event, rule)| (event.to_lowercase(), TagFilter::from_rule(rule)))
            .collect();
        Self { events }
    }

    /// Look up the tag filter for an event type
    ///
    /// Keys were lower-cased at compile time, so the lookup lower-cases too;
    /// event-type matching is case-insensitive by construction.
    pub fn lookup(&self, event: &str) -> Option<&TagFilter> {
        self.events.get(event.to_lowercase().as_str())
    }

    /// Number of subscribed event types
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event types are subscribed
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
