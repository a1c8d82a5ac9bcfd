//! Error types for the Vigil security assistant.
//!
//! This module defines a unified error enum covering every failure category
//! the application surfaces: configuration, I/O, query validation, security
//! rejections, external model services, and ingestion.

use thiserror::Error;

/// Unified error type for the Vigil security assistant.
///
/// All fallible functions in the application return `Result<T, AppError>`.
/// We never panic: errors must be represented and propagated.
///
/// The `Validation` and `SecurityViolation` variants describe the violated
/// rule category only; they must never echo the offending query content.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The query was malformed (empty or too long) - the caller's fault
    #[error("Invalid query: {0}")]
    Validation(String),

    /// The query tripped a security detection layer - the caller's fault,
    /// recorded as a security event before this error is raised
    #[error("Query rejected: {0}")]
    SecurityViolation(String),

    /// An embedding or generation capability failed - a transient
    /// infrastructure fault, surfaced without retry
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Ingestion errors (per-document failures are logged and skipped,
    /// this variant covers failures of the run itself)
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Validation("query cannot be empty".to_string());
        assert_eq!(err.to_string(), "Invalid query: query cannot be empty");

        let err = AppError::SecurityViolation("forbidden keyword".to_string());
        assert_eq!(err.to_string(), "Query rejected: forbidden keyword");
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: AppError = json_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
