//! Record error types

use thiserror::Error;

/// Errors that can occur when exporting a record value
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// The value graph reaches itself; plain JSON trees cannot express that
    #[error("value graph contains a reference cycle")]
    Cyclic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_display() {
        let err = ValueError::Cyclic;
        assert!(err.to_string().contains("reference cycle"));
    }
}
