//! Error types for Pricebook core operations.
//!
//! Every failure surfaces as a distinct variant so callers (and tests) can
//! branch on the kind of failure rather than on its message.

use thiserror::Error;

/// Result type alias for Pricebook operations.
pub type Result<T> = std::result::Result<T, PricebookError>;

/// Core error type for Pricebook operations.
#[derive(Debug, Error)]
pub enum PricebookError {
    /// A persisted collection file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persisted form is malformed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Storage backend error (read, write, rename)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Handle does not resolve to a record in the current collections
    #[error("Unknown record: {0}")]
    UnknownRecord(String),

    /// Relationship invariant between items and history entries is broken
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl From<std::io::Error> for PricebookError {
    fn from(err: std::io::Error) -> Self {
        PricebookError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PricebookError {
    fn from(err: serde_json::Error) -> Self {
        PricebookError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_storage() {
        let err: PricebookError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, PricebookError::Storage(_)));
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let err: PricebookError = serde_json::from_str::<Vec<i32>>("[1,")
            .unwrap_err()
            .into();
        assert!(matches!(err, PricebookError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error:"));
    }
}
