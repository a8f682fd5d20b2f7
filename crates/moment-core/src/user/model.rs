//! UserProfile domain model.

use serde::{Deserialize, Serialize};

/// Denormalized user profile.
///
/// The same shape serves as the stored `user:profile` JSON value and as the
/// user record returned by the remote service, so there is no separate DTO
/// layer for it. The cached copy is a read cache of server state, refreshed
/// opportunistically and never authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque user identifier (UUID format)
    pub uuid: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Tagline shown under the name
    #[serde(default)]
    pub slogan: String,
    /// Avatar reference (URL or asset ref)
    #[serde(default)]
    pub avatar: String,
}

impl UserProfile {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: String::new(),
            slogan: String::new(),
            avatar: String::new(),
        }
    }
}
