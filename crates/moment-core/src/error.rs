//! Error types for the MomentCount client core.

use thiserror::Error;

/// A shared error type for the client session core.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. The variants are coarse on
/// purpose: callers match on them to decide user-visible messaging
/// (bad credentials vs. network trouble vs. a local storage problem).
#[derive(Error, Debug, Clone)]
pub enum MomentError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Authentication rejected by the server (wrong username or password)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An operation that needs a stored identity found none
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The requested partner is already linked to another account
    #[error("Partner '{0}' is already linked to another account")]
    AlreadyLinked(String),

    /// Attempted to link an account to itself
    #[error("Cannot link an account to itself")]
    SelfLink,

    /// Network or remote service error
    #[error("Network error: {message}")]
    Network { message: String },

    /// Local key-value store error
    #[error("Store error: {message}")]
    Store { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MomentError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a Store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an InvalidCredentials error
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, Self::InvalidCredentials)
    }

    /// Check if this is a NotAuthenticated error
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
    }

    /// Check if this is a Network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Check if this is a Store error
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store { .. })
    }
}

impl From<std::io::Error> for MomentError {
    fn from(err: std::io::Error) -> Self {
        Self::Store {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MomentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for MomentError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, MomentError>`.
pub type Result<T> = std::result::Result<T, MomentError>;
