//! Stage error types
//!
//! The only errors a stage can raise are construction-time: a malformed
//! rules value or a misconfigured registry entry. Per-record processing
//! never produces one.

use thiserror::Error;

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Errors that can occur while constructing a stage
#[derive(Debug, Error)]
pub enum StageError {
    /// A caller passed a value of the wrong shape
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StageError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
