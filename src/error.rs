//! Error types for the pickwalk pipeline.
//!
//! Scoped error enums live next to the modules that produce them
//! ([`crate::messaging::MessagingError`], [`crate::cache::CacheError`]);
//! this umbrella type is what worker loops and the binary surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PickwalkError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Schema discovery error: {0}")]
    SchemaDiscoveryError(String),
    #[error("Event error: {0}")]
    EventError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Messaging error: {0}")]
    MessagingError(String),
    #[error("Cache error: {0}")]
    CacheError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for PickwalkError {
    fn from(error: serde_json::Error) -> Self {
        PickwalkError::ValidationError(format!("JSON serialization error: {error}"))
    }
}

impl From<sqlx::Error> for PickwalkError {
    fn from(err: sqlx::Error) -> Self {
        PickwalkError::DatabaseError(err.to_string())
    }
}

impl From<crate::messaging::MessagingError> for PickwalkError {
    fn from(error: crate::messaging::MessagingError) -> Self {
        PickwalkError::MessagingError(error.to_string())
    }
}

impl From<crate::cache::CacheError> for PickwalkError {
    fn from(error: crate::cache::CacheError) -> Self {
        PickwalkError::CacheError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PickwalkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PickwalkError::SchemaDiscoveryError("zones probe failed".to_string());
        assert_eq!(err.to_string(), "Schema discovery error: zones probe failed");
    }

    #[test]
    fn test_sqlx_conversion() {
        let err: PickwalkError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, PickwalkError::DatabaseError(_)));
    }

    #[test]
    fn test_serde_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: PickwalkError = json_err.into();
        assert!(matches!(err, PickwalkError::ValidationError(_)));
    }
}
