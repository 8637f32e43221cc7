//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Market Entry Secrets services
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MesError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MesError {
    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
        }
    }

    /// The message without its category prefix, for caller-facing envelopes.
    pub fn message(&self) -> &str {
        match self {
            Self::Database(msg)
            | Self::Config(msg)
            | Self::Network(msg)
            | Self::Auth(msg)
            | Self::NotFound(msg)
            | Self::InvalidInput(msg)
            | Self::Conflict(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, MesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category_and_message() {
        let err = MesError::Config("LEMLIST_API_KEY is not configured".into());
        assert_eq!(err.to_string(), "Configuration error: LEMLIST_API_KEY is not configured");
    }

    #[test]
    fn serializes_with_type_tag() {
        let err = MesError::Database("unique constraint violation".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Database");
        assert_eq!(json["message"], "unique constraint violation");
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(MesError::Network(String::new()).label(), "network");
        assert_eq!(MesError::Conflict(String::new()).label(), "conflict");
        assert_eq!(MesError::InvalidInput(String::new()).label(), "invalid_input");
    }

    #[test]
    fn message_drops_category_prefix() {
        let err = MesError::Conflict("sync already in progress".into());
        assert_eq!(err.message(), "sync already in progress");
    }
}
