//! Pipeline error types
//!
//! The pipeline can only fail while being assembled. Once spawned, stream
//! termination is signaled by channel closure, never by an error value.

use thiserror::Error;

use sift_stage::StageError;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage could not be constructed from configuration
    #[error("stage construction failed: {0}")]
    Stage(#[from] StageError),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::from(StageError::invalid_argument("events must be an object"));
        assert!(err.to_string().contains("stage construction failed"));
        assert!(err.to_string().contains("events must be an object"));
    }
}
