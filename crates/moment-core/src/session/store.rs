//! Session store trait.
//!
//! Defines the interface for session persistence operations.

use super::model::{Identity, SessionSnapshot};
use crate::error::Result;
use crate::link::PartnerLink;
use crate::user::UserProfile;
use async_trait::async_trait;

/// An abstract store for the single process-wide session.
///
/// This trait defines the contract for persisting and retrieving the cached
/// session, decoupling the application's core logic from the specific storage
/// mechanism (e.g., a key-value file, platform storage, an in-memory fake for
/// tests).
///
/// # Implementation Notes
///
/// Implementations must keep the link key and the cached partner name
/// paired: `save_link` writes both, `clear_link` removes both. Reads should
/// be lenient about partially written state (see `SessionSnapshot`).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a point-in-time snapshot of the stored session.
    ///
    /// # Returns
    ///
    /// - `Ok(SessionSnapshot)`: current stored state, fields absent where
    ///   nothing (or nothing parseable) is stored
    /// - `Err(_)`: the underlying store could not be read
    async fn load(&self) -> Result<SessionSnapshot>;

    /// Writes the identity fields of a fresh login/registration.
    ///
    /// Issues the user id, profile, and login timestamp writes together.
    /// There is no multi-key atomicity in the backing store, so a crash
    /// mid-sequence can leave a partial identity; a partial identity reads
    /// back as an expired session.
    async fn save_identity(&self, identity: &Identity) -> Result<()>;

    /// Overwrites the cached profile without touching identity or link state.
    ///
    /// Used by the bootstrap refresh after fetching current server state.
    async fn save_profile(&self, profile: &UserProfile) -> Result<()>;

    /// Caches an active partner link (key and display name together).
    async fn save_link(&self, link: &PartnerLink) -> Result<()>;

    /// Removes the partner link key and the cached partner name together.
    async fn clear_link(&self) -> Result<()>;

    /// Destroys the entire stored session (identity, profile, and link).
    async fn clear(&self) -> Result<()>;
}
