//! Declarative stage construction
//!
//! `Pipeline::from_stage_configs` assembles a chain from a TOML pipeline
//! description; each entry names a stage type plus its options. The
//! registry is the table behind that: stage type name to builder closure.
//! The built-in set covers this crate's own stages, and embedders with
//! custom stages hook them in with [`StageRegistry::with_builder`].
//!
//! ```ignore
//! let registry = StageRegistry::builtin()
//!     .with_builder("sample", |config| Ok(Box::new(SampleStage::from_config(config)?)));
//! let stage = registry.build("filter", &config)?;
//! ```

use std::collections::HashMap;

use crate::filter::{FilterConfig, FilterStage};
use crate::noop::NoopStage;
use crate::{Stage, StageError, StageResult};

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

/// Options for one stage entry in a pipeline description
///
/// A generic key-value map; each builder reads the keys it understands.
pub type StageConfig = HashMap<String, toml::Value>;

/// Builder closure for one stage type
pub type StageBuilder = Box<dyn Fn(&StageConfig) -> StageResult<Box<dyn Stage>> + Send + Sync>;

/// Table of stage builders keyed by type name
pub struct StageRegistry {
    builders: HashMap<String, StageBuilder>,
}

impl StageRegistry {
    /// A registry that knows no stage types
    ///
    /// Useful for embedders that want full control over the stage set.
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// A registry with this crate's stages: `filter` and `noop`
    pub fn builtin() -> Self {
        Self::empty()
            .with_builder("noop", |_| Ok(Box::new(NoopStage::new())))
            .with_builder("filter", build_filter)
    }

    /// Add a builder for a stage type, replacing any previous one
    ///
    /// Replacement is how an embedder swaps a built-in for its own
    /// implementation without renaming the type in its config files.
    pub fn with_builder<F>(mut self, type_name: impl Into<String>, builder: F) -> Self
    where
        F: Fn(&StageConfig) -> StageResult<Box<dyn Stage>> + Send + Sync + 'static,
    {
        self.builders.insert(type_name.into(), Box::new(builder));
        self
    }

    /// Build a stage from its type name and options
    ///
    /// # Errors
    /// `StageError::Config` when the type is unknown, or whatever the
    /// builder reports for bad options.
    pub fn build(&self, type_name: &str, config: &StageConfig) -> StageResult<Box<dyn Stage>> {
        match self.builders.get(type_name) {
            Some(builder) => builder(config),
            None => Err(StageError::config(format!(
                "no stage type named '{}' (known: {})",
                type_name,
                self.known_types().join(", ")
            ))),
        }
    }

    /// Whether a stage type is known
    pub fn contains(&self, type_name: &str) -> bool {
        self.builders.contains_key(type_name)
    }

    /// Sorted list of known stage type names
    pub fn known_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.builders.keys().map(|s| s.as_str()).collect();
        types.sort_unstable();
        types
    }
}

/// Build a filter stage from its options map
///
/// Reads `events` (the subscription rules table; rejecting any non-table
/// value with the usual `events must be an object`) and `enabled`.
fn build_filter(config: &StageConfig) -> StageResult<Box<dyn Stage>> {
    let mut filter_config = match config.get("events") {
        Some(events) => FilterConfig::from_toml(events)?,
        None => FilterConfig::default(),
    };

    if matches!(config.get("enabled"), Some(toml::Value::Boolean(false))) {
        filter_config.enabled = false;
    }

    Ok(Box::new(FilterStage::new(filter_config)))
}
