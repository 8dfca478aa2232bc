//! Error types for ReAG.
//!
//! This module defines a unified error enum that covers all error categories
//! in the workspace: configuration, I/O, completion backends, queries and
//! serialization.

use thiserror::Error;

/// Unified error type for ReAG.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Completion backend errors (transport, non-2xx, undecodable envelope)
    #[error("LLM error: {0}")]
    Llm(String),

    /// A whole query aborted; carries the underlying cause's message
    #[error("Query failed: {0}")]
    Query(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Wrap any error as a query failure, keeping its message.
    pub fn query(cause: impl std::fmt::Display) -> Self {
        AppError::Query(cause.to_string())
    }
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
    fn test_query_error_embeds_cause() {
        let cause = AppError::Llm("connection refused".to_string());
        let err = AppError::query(&cause);
        assert_eq!(
            err.to_string(),
            "Query failed: LLM error: connection refused"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
